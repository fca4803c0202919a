use crate::directed::rules::{RuleKind, Store};
use hyper::StatusCode;

pub const ROBOTS_TXT: &str = "User-agent: *\nDisallow: /\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    ServeRobotsTxt,
    Redirect { location: String, status: StatusCode },
}

/// Decide what to do with a request for `host` and `path_and_query`.
///
/// Robots requests are answered before any rule is consulted. Otherwise the
/// first rule (in the store's match order) whose fragment appears in `host`
/// wins, and unmatched hosts go to the default target.
///
/// Rewrites substitute every occurrence of the fragment in the whole URL,
/// so a fragment that also appears in the path or query is rewritten there too.
pub fn decide(store: &Store, host: &str, path_and_query: &str, secure: bool) -> Decision {
    if page(path_and_query) == "robots.txt" {
        return Decision::ServeRobotsTxt;
    }

    match store.find(host) {
        Some((fragment, rule)) => match rule.kind {
            RuleKind::RewriteHost => {
                let scheme = if secure { "https" } else { "http" };
                let full = format!("{}://{}{}", scheme, host, path_and_query);
                Decision::Redirect {
                    location: full.replace(fragment, &rule.target),
                    status: StatusCode::MOVED_PERMANENTLY,
                }
            }
            RuleKind::FixedTarget => Decision::Redirect {
                location: format!("https://{}", rule.target),
                status: StatusCode::FOUND,
            },
        },
        None => Decision::Redirect {
            location: format!("https://{}", store.default_target()),
            status: StatusCode::FOUND,
        },
    }
}

/// Last segment of the path, or `none` if it is empty.
fn page(path_and_query: &str) -> &str {
    let path = match path_and_query.split_once('?') {
        Some((path, _query)) => path,
        None => path_and_query,
    };
    match path.rsplit('/').next() {
        Some("") | None => "none",
        Some(last) => last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::from_json(
            r#"{
                "defaultRedirect": "fallback.com",
                "rules": {
                    "old.com": { "redirectTo": "new.com", "type": 1 },
                    "legacy.io": { "redirectTo": "newsite.com", "type": 2 }
                }
            }"#,
        )
        .unwrap()
    }

    fn redirect(location: &str, status: StatusCode) -> Decision {
        Decision::Redirect {
            location: location.to_string(),
            status,
        }
    }

    #[test]
    fn page_segments() {
        assert_eq!(page("/robots.txt"), "robots.txt");
        assert_eq!(page("/a/b/robots.txt?x=1"), "robots.txt");
        assert_eq!(page("/a/b/"), "none");
        assert_eq!(page("/"), "none");
        assert_eq!(page(""), "none");
        assert_eq!(page("/foo?next=/robots.txt"), "foo");
    }

    #[test]
    fn rewrite_insecure() {
        assert_eq!(
            decide(&store(), "old.com", "/foo?x=1", false),
            redirect("http://new.com/foo?x=1", StatusCode::MOVED_PERMANENTLY)
        );
    }

    #[test]
    fn rewrite_secure_subdomain() {
        assert_eq!(
            decide(&store(), "shop.old.com", "/", true),
            redirect("https://shop.new.com/", StatusCode::MOVED_PERMANENTLY)
        );
    }

    #[test]
    fn rewrite_keeps_port() {
        assert_eq!(
            decide(&store(), "old.com:8080", "/a", false),
            redirect("http://new.com:8080/a", StatusCode::MOVED_PERMANENTLY)
        );
    }

    #[test]
    fn rewrite_replaces_fragment_in_path_and_query_too() {
        assert_eq!(
            decide(&store(), "old.com", "/old.com/?ref=old.com", false),
            redirect(
                "http://new.com/new.com/?ref=new.com",
                StatusCode::MOVED_PERMANENTLY
            )
        );
    }

    #[test]
    fn fixed_target_discards_path() {
        let expected = redirect("https://newsite.com", StatusCode::FOUND);
        assert_eq!(decide(&store(), "legacy.io", "/anything", false), expected);
        assert_eq!(
            decide(&store(), "www.legacy.io", "/a/b?c=d", true),
            expected
        );
    }

    #[test]
    fn fixed_target_may_embed_path() {
        let store = Store::from_json(
            r#"{ "rules": { "promo": { "redirectTo": "shop.com/sale?src=promo", "type": 2 } } }"#,
        )
        .unwrap();
        assert_eq!(
            decide(&store, "promo.net", "/x", false),
            redirect("https://shop.com/sale?src=promo", StatusCode::FOUND)
        );
    }

    #[test]
    fn unmatched_goes_to_default() {
        assert_eq!(
            decide(&store(), "unrelated.net", "/x", false),
            redirect("https://fallback.com", StatusCode::FOUND)
        );
        assert_eq!(
            decide(&store(), "", "/", false),
            redirect("https://fallback.com", StatusCode::FOUND)
        );
    }

    #[test]
    fn robots_takes_precedence() {
        for host in ["old.com", "legacy.io", "unrelated.net", ""] {
            assert_eq!(
                decide(&store(), host, "/robots.txt", false),
                Decision::ServeRobotsTxt
            );
            assert_eq!(
                decide(&store(), host, "/deep/path/robots.txt?x=old.com", true),
                Decision::ServeRobotsTxt
            );
        }
    }

    #[test]
    fn robots_must_be_exact() {
        assert_ne!(
            decide(&store(), "old.com", "/robots.txt.bak", false),
            Decision::ServeRobotsTxt
        );
        assert_ne!(
            decide(&store(), "old.com", "/robots.txt/", false),
            Decision::ServeRobotsTxt
        );
    }

    #[test]
    fn longest_fragment_decides() {
        let store = Store::from_json(
            r#"{ "rules": {
                "old.com": { "redirectTo": "new.com", "type": 1 },
                "shop.old.com": { "redirectTo": "store.com", "type": 2 }
            } }"#,
        )
        .unwrap();
        assert_eq!(
            decide(&store, "shop.old.com", "/", false),
            redirect("https://store.com", StatusCode::FOUND)
        );
        assert_eq!(
            decide(&store, "blog.old.com", "/", false),
            redirect("http://blog.new.com/", StatusCode::MOVED_PERMANENTLY)
        );
    }

    #[test]
    fn idempotent() {
        let store = store();
        for (host, path, secure) in [
            ("old.com", "/foo?x=1", false),
            ("legacy.io", "/", true),
            ("nothing", "/robots.txt", false),
        ] {
            assert_eq!(
                decide(&store, host, path, secure),
                decide(&store, host, path, secure)
            );
        }
    }
}
