//! Output formatting for CLI commands.

use serde::Serialize;

use crate::analysis::token::{Token, TokenType};
use crate::analysis::tokenizer::hanlp::POS_ATTRIBUTE;
use crate::cli::args::{HansegArgs, OutputFormat};
use crate::configuration::Configuration;
use crate::error::Result;
use crate::factory::resolver::Resolution;
use crate::segment::lexical::CompositeLevel;

/// One token as printed by the CLI.
#[derive(Debug, Serialize)]
pub struct TokenOutput {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub position: usize,
    pub position_increment: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
}

impl From<Token> for TokenOutput {
    fn from(token: Token) -> Self {
        TokenOutput {
            pos: token.attribute(POS_ATTRIBUTE).map(str::to_string),
            token_type: token.token_type(),
            text: token.text,
            start: token.start_offset,
            end: token.end_offset,
            position: token.position,
            position_increment: token.position_increment,
        }
    }
}

/// Result of segmenting one text.
#[derive(Debug, Serialize)]
pub struct SegmentationResult {
    pub kind: String,
    pub text: String,
    pub tokens: Vec<TokenOutput>,
    pub duration_us: u64,
}

/// One tokenizer type.
#[derive(Debug, Serialize)]
pub struct KindInfo {
    pub name: String,
    pub description: String,
}

/// What a tokenizer is built from.
#[derive(Debug, Serialize)]
pub struct InspectionResult {
    pub kind: String,
    pub configuration: Configuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<CompositeLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    pub models: Vec<ModelStatus>,
}

/// State of one model in the registry.
#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub model: String,
    pub state: String,
}

fn output_json<T: Serialize>(result: &T, args: &HansegArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Render tokens as `text/pos` separated by spaces; overlapping tokens are
/// bracketed after the token they belong to.
pub fn format_tokens(tokens: &[TokenOutput]) -> String {
    let mut line = String::new();
    for token in tokens {
        let rendered = match &token.pos {
            Some(pos) => format!("{}/{pos}", token.text),
            None => token.text.clone(),
        };
        if token.position_increment == 0 && !line.is_empty() {
            line.push_str(&format!("[{rendered}]"));
        } else {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&rendered);
        }
    }
    line
}

/// Print a segmentation result.
pub fn output_segmentation(result: &SegmentationResult, args: &HansegArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(result, args),
        OutputFormat::Human => {
            println!("{}", format_tokens(&result.tokens));
            if args.verbosity() > 1 {
                for token in &result.tokens {
                    println!(
                        "  {:<12} [{}, {}) position {}{}",
                        token.text,
                        token.start,
                        token.end,
                        token.position,
                        token
                            .pos
                            .as_deref()
                            .map(|p| format!(" pos {p}"))
                            .unwrap_or_default()
                    );
                }
                println!("  ({} tokens in {}µs)", result.tokens.len(), result.duration_us);
            }
            Ok(())
        }
    }
}

/// Print the tokenizer types.
pub fn output_kinds(kinds: &[KindInfo], args: &HansegArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(&kinds, args),
        OutputFormat::Human => {
            for kind in kinds {
                println!("{:<16} {}", kind.name, kind.description);
            }
            Ok(())
        }
    }
}

/// Print an inspection.
pub fn output_inspection(result: &InspectionResult, args: &HansegArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(result, args),
        OutputFormat::Human => {
            let config = &result.configuration;
            println!("Tokenizer: {}", result.kind);
            println!("  index mode:                {}", config.index_mode);
            println!("  custom dictionary:         {}", config.custom_dictionary);
            println!("  custom dictionary forcing: {}", config.custom_dictionary_forcing);
            println!("  place recognition:         {}", config.place_recognize);
            println!("  organization recognition:  {}", config.organization_recognize);
            println!("  number-quantifier merging: {}", config.number_quantifier_recognize);
            println!("  stop dictionary:           {}", config.stop_dictionary);
            println!("  normalization:             {}", config.normalization);
            println!("  part of speech:            {}", config.part_of_speech_tagging);
            println!("  model root:                {}", config.paths.root.display());
            if let Some(level) = result.level {
                println!("  stages:                    {level}");
            }
            if let Some(resolution) = &result.resolution {
                println!("  crf_pos:                   {}", resolution.pos);
                println!("  crf_ner:                   {}", resolution.ner);
            }
            println!("Models:");
            for model in &result.models {
                println!("  {:<12} {}", model.state, model.model);
            }
            Ok(())
        }
    }
}
