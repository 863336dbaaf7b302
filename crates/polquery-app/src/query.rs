//! The `query` use case: run one resolved query against a loaded policy.

use polquery_domain::{
    CandidateSet, CondExprNode, ObjPerm, QueryError, StoreResult, Symbol, SymbolStore,
    candidate_classes, candidate_roles, candidate_syntactic_types, candidate_types,
    compare_cond_expr_booleans, find_symbols, sort_by_policy_order_with,
};
use polquery_settings::ResolvedQuery;
use polquery_types::{MatchedSymbol, QueryResultEntry, QueryTarget, SymbolKind};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

pub fn run_query<S>(store: &S, query: &ResolvedQuery) -> anyhow::Result<QueryResultEntry>
where
    S: SymbolStore + ?Sized,
{
    debug!(
        query = %query.name,
        target = query.target.as_str(),
        pattern = query.pattern.as_deref().unwrap_or(""),
        regex = query.is_regex(),
        indirect = query.is_indirect(),
        kinds = ?query.kinds.names(),
        "running query"
    );

    let matches = matches_for(store, query).map_err(|err| {
        let code = err.code();
        anyhow::Error::new(err).context(format!("query `{}` failed ({code})", query.name))
    })?;

    info!(query = %query.name, matches = matches.len(), "query finished");

    let fingerprint = fingerprint_for_query(&query.name, query.target, &matches);
    Ok(QueryResultEntry {
        name: query.name.clone(),
        target: query.target,
        pattern: query.pattern.clone(),
        regex: query.is_regex(),
        indirect: query.is_indirect(),
        symbols: if query.target.is_type_search() {
            query.kinds.names().into_iter().map(str::to_string).collect()
        } else {
            Vec::new()
        },
        classes: query.classes.clone(),
        matches,
        fingerprint,
    })
}

fn matches_for<S>(store: &S, query: &ResolvedQuery) -> Result<Vec<MatchedSymbol>, QueryError>
where
    S: SymbolStore + ?Sized,
{
    let criterion = query.criterion();
    let indirect = query.is_indirect();
    match query.target {
        QueryTarget::Type => {
            let set = candidate_types(store, &criterion, indirect, query.kinds)?;
            type_matches(store, &set)
        }
        QueryTarget::SyntacticType => {
            let set = candidate_syntactic_types(store, &criterion, indirect, query.kinds)?;
            type_matches(store, &set)
        }
        QueryTarget::Role => {
            let set = candidate_roles(store, &criterion)?;
            plain_matches(store, &set, "role")
        }
        QueryTarget::Class => class_matches(store, &query.classes),
        QueryTarget::Level => {
            let set = find_symbols(store, SymbolKind::Level, &criterion)?;
            plain_matches(store, &set, "level")
        }
        QueryTarget::Category => {
            let set = find_symbols(store, SymbolKind::Category, &criterion)?;
            plain_matches(store, &set, "category")
        }
        QueryTarget::Boolean => {
            let set = find_symbols(store, SymbolKind::Boolean, &criterion)?;
            plain_matches(store, &set, "boolean")
        }
        QueryTarget::Conditional => {
            let mut out = Vec::new();
            for cond in store.conditionals() {
                let cond = cond?;
                if compare_cond_expr_booleans(store, store.cond_expr(cond), &criterion)?.is_match()
                {
                    let nodes = store.cond_expr(cond).collect::<StoreResult<Vec<_>>>()?;
                    out.push(MatchedSymbol {
                        name: render_cond_expr(store, &nodes)?,
                        kind: "conditional".to_string(),
                        value: cond.value(),
                        permissions: Vec::new(),
                    });
                }
            }
            Ok(out)
        }
    }
}

fn type_matches<S>(store: &S, set: &CandidateSet<Symbol>) -> Result<Vec<MatchedSymbol>, QueryError>
where
    S: SymbolStore + ?Sized,
{
    let mut out = Vec::with_capacity(set.len());
    for ty in set {
        let kind = if store.is_attribute(*ty)? {
            "attribute"
        } else {
            "type"
        };
        out.push(matched(store, *ty, kind)?);
    }
    Ok(out)
}

fn plain_matches<S>(
    store: &S,
    set: &CandidateSet<Symbol>,
    kind: &str,
) -> Result<Vec<MatchedSymbol>, QueryError>
where
    S: SymbolStore + ?Sized,
{
    set.iter().map(|s| matched(store, *s, kind)).collect()
}

fn class_matches<S>(store: &S, classes: &[String]) -> Result<Vec<MatchedSymbol>, QueryError>
where
    S: SymbolStore + ?Sized,
{
    let set = candidate_classes(store, classes)?;
    let mut objs: Vec<(u32, ObjPerm)> = Vec::with_capacity(set.len());
    for class in &set {
        let mut op = ObjPerm::new();
        op.set_class_name(Some(store.name_of(*class)?));
        for perm in store.permissions_of(*class) {
            op.append_perm(Some(perm?));
        }
        objs.push((store.numeric_value(*class)?, op));
    }
    sort_by_policy_order_with(store, &mut objs, |(_, op)| op)?;

    Ok(objs
        .into_iter()
        .map(|(value, op)| MatchedSymbol {
            name: op.class_name().unwrap_or_default().to_string(),
            kind: "class".to_string(),
            value,
            permissions: op.perms().to_vec(),
        })
        .collect())
}

fn matched<S>(store: &S, symbol: Symbol, kind: &str) -> Result<MatchedSymbol, QueryError>
where
    S: SymbolStore + ?Sized,
{
    Ok(MatchedSymbol {
        name: store.name_of(symbol)?.to_string(),
        kind: kind.to_string(),
        value: store.numeric_value(symbol)?,
        permissions: Vec::new(),
    })
}

/// Infix form of a reverse Polish conditional expression.
pub fn render_cond_expr<S>(store: &S, nodes: &[CondExprNode]) -> Result<String, QueryError>
where
    S: SymbolStore + ?Sized,
{
    // (text, is compound)
    let mut stack: Vec<(String, bool)> = Vec::new();
    for node in nodes {
        match node {
            CondExprNode::Bool(b) => stack.push((store.name_of(*b)?.to_string(), false)),
            CondExprNode::Op(op) if op.is_unary() => {
                let (operand, compound) = stack.pop().unwrap_or_default();
                stack.push((format!("{}{}", op.token(), group(&operand, compound)), false));
            }
            CondExprNode::Op(op) => {
                let (rhs, rc) = stack.pop().unwrap_or_default();
                let (lhs, lc) = stack.pop().unwrap_or_default();
                stack.push((
                    format!("{} {} {}", group(&lhs, lc), op.token(), group(&rhs, rc)),
                    true,
                ));
            }
        }
    }
    Ok(stack.pop().map(|(text, _)| text).unwrap_or_default())
}

fn group(text: &str, compound: bool) -> String {
    if compound {
        format!("({text})")
    } else {
        text.to_string()
    }
}

/// Compute a stable SHA-256 fingerprint for a query result.
///
/// Identity fields:
/// - query name
/// - target
/// - matched names, in result order
pub fn fingerprint_for_query(name: &str, target: QueryTarget, matches: &[MatchedSymbol]) -> String {
    let names: Vec<&str> = matches.iter().map(|m| m.name.as_str()).collect();
    let joined = names.join(",");
    let canonical = [name, target.as_str(), joined.as_str()].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}
