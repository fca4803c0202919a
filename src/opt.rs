use clap::{ArgAction, Parser};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Redirect HTTP traffic by matching fragments of the requested host name
#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Options {
    /// Logging verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 9080)]
    pub port: u16,

    /// Address to listen on
    #[arg(long, env = "BIND_ADDRESS", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    #[arg(
        short,
        long,
        env = "RULES_PATH",
        default_value = "redirects.json",
        help = "Path to the JSON rules document (--help for more)",
        long_help = r#"Path to the JSON rules document:
    - each key is matched against the request's Host header by substring
    - the longest matching key wins, ties broken alphabetically
    - type 1 rewrites the matched text in the full URL (301)
    - any other type redirects to https://{redirectTo} (302)
    - unmatched hosts redirect to https://{defaultRedirect} (302)
Example:
    {
      "defaultRedirect": "example.org",
      "rules": {
        "old.com": { "redirectTo": "new.com", "type": 1 },
        "legacy.io": { "redirectTo": "newsite.com", "type": 2 }
      }
    }"#
    )]
    pub rules: PathBuf,

    /// Treat requests with `X-Forwarded-Proto: https` as secure when rewriting
    #[arg(long, env = "TRUST_FORWARDED_PROTO")]
    pub trust_forwarded_proto: bool,
}
