use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Completion Endpoint Args ---
    /// API key sent in the `api-key` header of every completion request
    #[arg(long, env = "DIAL_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the DIAL endpoint (e.g., https://ai-proxy.lab.epam.com)
    #[arg(long, env = "DIAL_ENDPOINT", default_value = "https://ai-proxy.lab.epam.com")]
    pub endpoint: String,

    /// Deployment (model) name to invoke (e.g., gpt-4o)
    #[arg(long, env = "DIAL_DEPLOYMENT", default_value = "gpt-4o")]
    pub deployment: String,

    /// Connect timeout for the HTTP transport, in seconds
    #[arg(long, env = "DIAL_CONNECT_TIMEOUT", default_value = "30")]
    pub connect_timeout: u64,

    // --- Session Args ---
    /// Request whole-body completions instead of streamed ones
    #[arg(long, env = "DIAL_NO_STREAM", default_value = "false")]
    pub no_stream: bool,

    /// System prompt to start the conversation with. When unset the session asks for one.
    #[arg(long, env = "DIAL_SYSTEM_PROMPT")]
    pub system_prompt: Option<String>,
}
