//! Merging numerals with the quantifier that follows them (`3个`, `五公里`).

use crate::segment::Word;

/// Nature of a merged numeral-quantifier word.
pub const NUMBER_QUANTIFIER_NATURE: &str = "mq";

/// Common quantifiers, recognized even without a `q` nature.
pub const QUANTIFIERS: &[&str] = &[
    "个", "只", "件", "条", "张", "本", "位", "次", "年", "月", "日", "天", "元", "块", "米",
    "公里", "岁", "名", "家", "台", "辆", "斤", "克", "吨", "倍", "分", "秒", "小时", "层", "套",
    "场", "首",
];

const CHINESE_NUMERALS: &str = "零〇一二三四五六七八九十百千万亿两";

fn is_numeral(text: &str, word: &Word) -> bool {
    if text.is_empty() {
        return false;
    }
    text.chars().all(|c| c.is_ascii_digit() || c == '.')
        || text.chars().all(|c| CHINESE_NUMERALS.contains(c))
        || (word.nature.as_deref() == Some("m") && !text.chars().any(char::is_whitespace))
}

fn is_quantifier(text: &str, word: &Word) -> bool {
    word.nature.as_deref() == Some("q") || QUANTIFIERS.contains(&text)
}

/// Merge every run of numerals directly followed by a quantifier into one
/// `mq` word.
pub fn merge_number_quantifiers(chars: &[char], words: Vec<Word>) -> Vec<Word> {
    let texts: Vec<String> = words
        .iter()
        .map(|w| chars[w.start..w.end].iter().collect())
        .collect();
    let mut merged = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        let mut j = i;
        while j < words.len()
            && is_numeral(&texts[j], &words[j])
            && (j == i || words[j - 1].end == words[j].start)
        {
            j += 1;
        }
        if j > i
            && j < words.len()
            && words[j - 1].end == words[j].start
            && is_quantifier(&texts[j], &words[j])
        {
            merged.push(Word {
                start: words[i].start,
                end: words[j].end,
                nature: Some(NUMBER_QUANTIFIER_NATURE.to_string()),
            });
            i = j + 1;
        } else {
            merged.push(words[i].clone());
            i += 1;
        }
    }
    merged
}
