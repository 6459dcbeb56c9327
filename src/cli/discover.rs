//! Corpus exploration (`autotag discover`)

use super::helpers::Context;
use autotag_core::{discover::load_corpus, error::Result, matching::WordForm, Discovery};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum DiscoverCommand {
    /// Most frequent content words
    Keywords {
        alias: Option<String>,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Phrases matching a POS pattern such as "ADJ NOUN"
    Pattern {
        pattern: String,

        alias: Option<String>,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Documents containing a keyword
    Keyword {
        word: String,

        alias: Option<String>,

        #[arg(long, conflicts_with = "stem")]
        lemma: bool,

        #[arg(long)]
        stem: bool,

        #[arg(short, long)]
        limit: Option<usize>,
    },
}

pub fn handle(ctx: &Context, command: DiscoverCommand) -> Result<()> {
    let discovery = Discovery::new(ctx.analyzer());
    let default_limit = ctx.settings.discover_limit;

    match command {
        DiscoverCommand::Keywords { alias, limit } => {
            let corpus = load_corpus(&ctx.resolve_dir(alias.as_deref())?, &ctx.settings.extension);
            let terms = discovery.keywords(&corpus, limit.unwrap_or(default_limit))?;
            println!("Top keywords across {} document(s):", corpus.len());
            for term in terms {
                println!("  {:<24} {:>5}  ({} docs)", term.term, term.count, term.documents);
            }
        }

        DiscoverCommand::Pattern { pattern, alias, limit } => {
            let corpus = load_corpus(&ctx.resolve_dir(alias.as_deref())?, &ctx.settings.extension);
            let phrases = discovery.pattern_phrases(&corpus, &pattern, limit.unwrap_or(default_limit))?;
            if phrases.is_empty() {
                println!("No phrases match '{}'", pattern);
            }
            for phrase in phrases {
                println!("  {:<32} {:>5}  ({} docs)", phrase.term, phrase.count, phrase.documents);
            }
        }

        DiscoverCommand::Keyword {
            word,
            alias,
            lemma,
            stem,
            limit,
        } => {
            let root = ctx.resolve_dir(alias.as_deref())?;
            let corpus = load_corpus(&root, &ctx.settings.extension);
            let form = if lemma {
                WordForm::Lemma
            } else if stem {
                WordForm::Stem
            } else {
                WordForm::Surface
            };
            let files = discovery.keyword_occurrences(&corpus, &word, form, limit.unwrap_or(default_limit))?;
            let total: usize = files.iter().map(|f| f.count).sum();
            println!("'{}' occurs {} time(s) in {} document(s)", word, total, files.len());
            for file in files {
                let path = file.path.strip_prefix(&root).unwrap_or(&file.path);
                println!("  {:>5}  {}", file.count, path.display());
            }
        }
    }

    Ok(())
}
