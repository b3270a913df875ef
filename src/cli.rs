use crate::config::{
    Config, DEFAULT_API_BASE, DEFAULT_CREDENTIALS_PATH, DEFAULT_REDIRECT_PORT,
    DEFAULT_TOKEN_CACHE_PATH, DEFAULT_USER_ID,
};
use crate::gmail_api::ListQuery;
use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Message counts must be at least one.
fn limit_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(1..)
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "Read-only Gmail explorer", long_about = None)]
pub struct Cli {
    /// OAuth client secret file downloaded from the cloud console.
    #[clap(long, global = true, default_value = DEFAULT_CREDENTIALS_PATH)]
    pub credentials: PathBuf,

    /// File where access and refresh tokens are cached between runs.
    #[clap(long, global = true, default_value = DEFAULT_TOKEN_CACHE_PATH)]
    pub token_cache: PathBuf,

    /// Local port for the OAuth redirect.
    #[clap(long, global = true, default_value_t = DEFAULT_REDIRECT_PORT)]
    pub redirect_port: u16,

    /// Mailbox to read; `me` is the authenticated user.
    #[clap(long, global = true, default_value = DEFAULT_USER_ID)]
    pub user: String,

    #[clap(long, global = true, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Enable debug logging.
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[clap(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all labels with their ids.
    Labels,
    /// Show id and snippet of the newest inbox messages.
    Inbox {
        #[clap(long, default_value_t = 10, value_parser = limit_parser())]
        limit: usize,
    },
    /// Show subject and the start of the body of the newest inbox messages.
    Read {
        #[clap(long, default_value_t = 3, value_parser = limit_parser())]
        limit: usize,
        #[clap(long, default_value_t = 20)]
        preview_chars: usize,
    },
    /// Find messages by label or by search query.
    Search(SearchArgs),
    /// Download every attachment of one message.
    Attachments {
        message_id: String,
        #[clap(long, default_value = "mail_files")]
        dir: PathBuf,
    },
    /// Count inbox messages by MIME structure.
    MimeStats {
        #[clap(long, default_value_t = 100, value_parser = limit_parser())]
        limit: usize,
    },
    /// Clear the stored client secret from the system keyring and exit.
    ClearKeyring,
}

#[derive(Args, Debug)]
#[clap(group(clap::ArgGroup::new("filter").required(true).args(&["label", "query"])))]
pub struct SearchArgs {
    /// Label id, e.g. INBOX or Label_123.
    #[clap(long)]
    pub label: Option<String>,
    /// Search expression, e.g. "subject:Google".
    #[clap(long)]
    pub query: Option<String>,
    #[clap(long, default_value_t = 10, value_parser = limit_parser())]
    pub limit: usize,
}

impl SearchArgs {
    pub fn to_query(&self) -> ListQuery {
        ListQuery {
            label_ids: self.label.iter().cloned().collect(),
            query: self.query.clone(),
            max_results: None,
        }
    }
}

impl Cli {
    pub fn config(&self) -> Config {
        Config::default()
            .with_api_base(self.api_base.as_str())
            .with_user_id(self.user.as_str())
            .with_credentials_path(self.credentials.clone())
            .with_token_cache_path(self.token_cache.clone())
            .with_redirect_port(self.redirect_port)
    }
}
