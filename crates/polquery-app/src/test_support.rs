use polquery_domain::{PolicyModel, QueryFlags};
use polquery_settings::ResolvedQuery;
use polquery_types::{PolicyForm, QueryTarget, SymbolKindMask};

pub const POLICY_JSON: &str = r#"{
  "schema": "polquery.snapshot.v1",
  "form": "kernel_source",
  "version": 24,
  "mls": true,
  "types": [
    {"name": "httpd_t", "aliases": ["apache_t"]},
    {"name": "sshd_t"}
  ],
  "attributes": [{"name": "domain", "members": ["httpd_t", "sshd_t"]}],
  "roles": ["object_r", "system_r"],
  "classes": [
    {"name": "file", "permissions": ["read", "write"]},
    {"name": "dir", "permissions": ["search", "read"]},
    {"name": "process", "permissions": ["transition"]}
  ],
  "levels": [{"name": "s0", "aliases": ["low"]}],
  "categories": [{"name": "c0"}, {"name": "c1"}],
  "booleans": ["httpd_enable_cgi", "allow_ssh"],
  "conditionals": [{"expr": ["httpd_enable_cgi", "allow_ssh", "!", "&&"]}]
}"#;

pub fn targeted(form: PolicyForm) -> PolicyModel {
    let text = POLICY_JSON.replace("\"kernel_source\"", &format!("\"{}\"", form.as_str()));
    polquery_snapshot::parse_policy_snapshot(&text).expect("test policy")
}

/// Literal query restricted to plain types.
pub fn query(name: &str, target: QueryTarget, pattern: Option<&str>) -> ResolvedQuery {
    ResolvedQuery {
        name: name.to_string(),
        target,
        pattern: pattern.map(str::to_string),
        flags: QueryFlags::NONE,
        kinds: SymbolKindMask::TYPE,
        classes: Vec::new(),
        regex_size_limit: None,
    }
}
