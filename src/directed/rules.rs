use crate::err::ConfigError;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Replace the matched fragment inside the full request URL, permanently.
    RewriteHost,
    /// Send everything to `https://{target}`, temporarily.
    FixedTarget,
}

impl RuleKind {
    fn from_type_code(code: i64) -> Self {
        match code {
            1 => RuleKind::RewriteHost,
            _ => RuleKind::FixedTarget,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRule {
    pub target: String,
    pub kind: RuleKind,
}

/// Immutable set of redirect rules, built once at startup.
///
/// Rules are kept in match order: longest fragment first, equal lengths in
/// lexicographic order. A host matching several fragments therefore always
/// resolves to the most specific one, independent of document key order.
#[derive(Debug, Clone, Default)]
pub struct Store {
    default_target: String,
    rules: Vec<(String, RedirectRule)>,
}

// `null` anywhere reads as the zero value, same as an absent field.
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct Document {
    #[serde(
        alias = "DefaultRedirect",
        alias = "defaultredirect",
        deserialize_with = "null_as_default"
    )]
    default_redirect: String,
    #[serde(alias = "Rules", deserialize_with = "null_as_default")]
    rules: BTreeMap<String, Option<DocumentRule>>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct DocumentRule {
    #[serde(
        alias = "RedirectTo",
        alias = "redirectto",
        deserialize_with = "null_as_default"
    )]
    redirect_to: String,
    #[serde(rename = "type", alias = "Type", deserialize_with = "null_as_default")]
    type_code: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Store {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let Document {
            default_redirect,
            rules,
        } = serde_json::from_str::<Option<Document>>(json)?.unwrap_or_default();

        if default_redirect.is_empty() {
            log::warn!("No default redirect configured");
        }

        let mut rules = rules
            .into_iter()
            .map(|(fragment, rule)| {
                let rule = rule.unwrap_or_default();
                if rule.redirect_to.is_empty() {
                    log::warn!("Rule {:?} has an empty redirect target", fragment);
                }
                let rule = RedirectRule {
                    target: rule.redirect_to,
                    kind: RuleKind::from_type_code(rule.type_code),
                };
                (fragment, rule)
            })
            .collect::<Vec<_>>();
        rules.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        Ok(Self {
            default_target: default_redirect,
            rules,
        })
    }

    pub fn default_target(&self) -> &str {
        &self.default_target
    }

    /// Rules in match order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &RedirectRule)> {
        self.rules.iter().map(|(fragment, rule)| (fragment.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule, in match order, whose fragment is contained anywhere in `host`.
    pub fn find(&self, host: &str) -> Option<(&str, &RedirectRule)> {
        self.rules().find(|(fragment, _)| host.contains(fragment))
    }
}
