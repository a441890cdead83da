use clap::Parser;
use url::Url;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Backend Args ---
    /// Base URL of the Craddule backend (e.g., https://api.craddule.com)
    #[arg(long, env = "CRADDULE_API_BASE_URL")]
    pub api_base_url: Url,

    // --- Session Args ---
    /// Bearer token sent with every request. Ignored when --session-file is set.
    #[arg(long, env = "CRADDULE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// JSON file written by the sign-in flow; the token is read from its `access_token` key.
    #[arg(long, env = "CRADDULE_SESSION_FILE")]
    pub session_file: Option<String>,

    // --- Chat Args ---
    /// Conversation to open on start. Without it the thread starts empty.
    #[arg(long, env = "CRADDULE_CONVERSATION_ID")]
    pub conversation_id: Option<String>,

    /// Terminal width used to decide whether the conversation sidebar starts open.
    #[arg(long, env = "VIEWPORT_WIDTH", default_value = "1024")]
    pub viewport_width: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_arguments() {
        let args = Args::try_parse_from([
            "craddule-chat",
            "--api-base-url",
            "http://localhost:5000",
        ]).unwrap();
        assert_eq!(args.api_base_url.as_str(), "http://localhost:5000/");
        assert_eq!(args.viewport_width, 1024);
        assert!(args.conversation_id.is_none());
    }

    #[test]
    fn rejects_invalid_base_url() {
        let parsed = Args::try_parse_from(["craddule-chat", "--api-base-url", "not a url"]);
        assert!(parsed.is_err());
    }
}
