use crate::directed::routes::{respond_to_request, State};
use crate::directed::rules::Store;
use crate::err::Error;
use crate::http::run_simple_server;
use crate::opt;
use hyper::body::Incoming;
use std::net::SocketAddr;

mod decide;
mod routes;
mod rules;

pub async fn main(options: opt::Options) -> Result<(), Error> {
    let opt::Options {
        verbose: _,
        port,
        bind,
        rules,
        trust_forwarded_proto,
    } = options;

    let store = match Store::load(&rules) {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to load rules from {}: {}", rules.display(), e);
            return Err(e.into());
        }
    };
    log::info!(
        "Loaded {} rules from {} (default: {})",
        store.len(),
        rules.display(),
        store.default_target()
    );
    if store.is_empty() {
        log::warn!("No rules configured, every request goes to the default target");
    }
    for (fragment, rule) in store.rules() {
        log::debug!("{} -> {:?} {}", fragment, rule.kind, rule.target);
    }

    let state = State {
        store,
        trust_forwarded_proto,
    };

    run_simple_server(
        SocketAddr::new(bind, port),
        state,
        respond_to_request::<Incoming>,
    )
    .await?;

    Ok(())
}
