use polquery_domain::QueryFlags;
use polquery_types::SymbolKindMask;

/// Defaults a profile applies to every query before file settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryDefaults {
    pub profile: String,
    pub flags: QueryFlags,
    pub kinds: SymbolKindMask,
}

/// Preset profiles.
///
/// Keep these small and readable. Anything complex belongs in per-query config.
pub fn preset(profile: &str) -> QueryDefaults {
    match profile {
        "attributes" => attributes_profile(),
        "all" => all_profile(),
        // default
        _ => types_profile(),
    }
}

fn types_profile() -> QueryDefaults {
    QueryDefaults {
        profile: "types".to_string(),
        flags: QueryFlags::NONE,
        kinds: SymbolKindMask::TYPE,
    }
}

fn attributes_profile() -> QueryDefaults {
    // Attribute queries are usually asked to see who is in them.
    QueryDefaults {
        profile: "attributes".to_string(),
        flags: QueryFlags::INDIRECT,
        kinds: SymbolKindMask::ATTRIBUTE,
    }
}

fn all_profile() -> QueryDefaults {
    QueryDefaults {
        profile: "all".to_string(),
        flags: QueryFlags::NONE,
        kinds: SymbolKindMask::BOTH,
    }
}
