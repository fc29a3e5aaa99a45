//! Bank profiles: declarative per-issuer extraction configuration.
//!
//! A [`ProfileSpec`] is plain data (and can be loaded from JSON). Compiling
//! it yields an immutable [`BankProfile`] that the generic statement parser
//! consumes. Profiles live in an explicit [`ProfileRegistry`] whose order is
//! the detection priority.

mod builtin;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProfileError;
use crate::statement::ledger::{GrammarSpec, LineGrammar, SignPolicy};
use crate::statement::rules::{DateOrder, PatternSet};

pub use builtin::builtin_specs;

/// Literals that identify an issuer on the first pages of a statement.
///
/// Matching is case-insensitive: every `all_of` literal must appear, and
/// when `any_of` is non-empty at least one of those must appear as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSpec {
    #[serde(default)]
    pub all_of: Vec<String>,
    #[serde(default)]
    pub any_of: Vec<String>,
}

/// Declarative definition of one issuer's layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSpec {
    /// Display name, e.g. "HDFC Bank".
    pub name: String,
    /// Detection signature.
    pub signature: SignatureSpec,
    /// Candidate patterns for the card's last four digits, in priority order.
    pub card_last4: Vec<String>,
    /// Candidate patterns for the billing cycle (two captures).
    pub billing_cycle: Vec<String>,
    /// Candidate patterns for the payment due date.
    pub payment_due_date: Vec<String>,
    /// Candidate patterns for the total amount due.
    pub total_amount_due: Vec<String>,
    /// Day/month order of numeric dates.
    #[serde(default)]
    pub date_order: DateOrder,
    /// Sign convention of ledger amounts.
    #[serde(default)]
    pub sign_policy: SignPolicy,
    /// Ledger row grammar.
    pub ledger: GrammarSpec,
}

impl ProfileSpec {
    /// Load a profile definition from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let load_err = |reason: String| ProfileError::Load {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| load_err(e.to_string()))
    }

    /// Compile into an immutable profile.
    pub fn compile(&self) -> Result<BankProfile, ProfileError> {
        BankProfile::compile(self)
    }
}

#[derive(Debug, Clone)]
struct Signature {
    all_of: Vec<String>,
    any_of: Vec<String>,
}

impl Signature {
    fn matches(&self, haystack_lower: &str) -> bool {
        self.all_of.iter().all(|s| haystack_lower.contains(s.as_str()))
            && (self.any_of.is_empty() || self.any_of.iter().any(|s| haystack_lower.contains(s.as_str())))
    }
}

/// Compiled, immutable bank profile.
#[derive(Debug, Clone)]
pub struct BankProfile {
    name: String,
    signature: Signature,
    card_last4: PatternSet,
    billing_cycle: PatternSet,
    payment_due_date: PatternSet,
    total_amount_due: PatternSet,
    date_order: DateOrder,
    sign_policy: SignPolicy,
    grammar: LineGrammar,
}

impl BankProfile {
    /// Compile a spec, validating every pattern.
    pub fn compile(spec: &ProfileSpec) -> Result<Self, ProfileError> {
        let lower = |v: &[String]| -> Vec<String> {
            v.iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        let signature = Signature {
            all_of: lower(&spec.signature.all_of),
            any_of: lower(&spec.signature.any_of),
        };
        if signature.all_of.is_empty() && signature.any_of.is_empty() {
            return Err(ProfileError::EmptySignature(spec.name.clone()));
        }

        let compile = |field: &str, templates: &[String]| {
            PatternSet::compile(templates).map_err(|source| ProfileError::InvalidPattern {
                profile: spec.name.clone(),
                field: field.to_string(),
                source,
            })
        };

        let grammar = LineGrammar::compile(&spec.ledger).map_err(|source| ProfileError::InvalidPattern {
            profile: spec.name.clone(),
            field: "ledger".to_string(),
            source,
        })?;
        let missing = grammar.missing_groups();
        if !missing.is_empty() {
            return Err(ProfileError::InvalidGrammar {
                profile: spec.name.clone(),
                reason: format!("pattern lacks named groups: {}", missing.join(", ")),
            });
        }

        Ok(Self {
            name: spec.name.clone(),
            signature,
            card_last4: compile("card_last4", &spec.card_last4)?,
            billing_cycle: compile("billing_cycle", &spec.billing_cycle)?,
            payment_due_date: compile("payment_due_date", &spec.payment_due_date)?,
            total_amount_due: compile("total_amount_due", &spec.total_amount_due)?,
            date_order: spec.date_order,
            sign_policy: spec.sign_policy,
            grammar,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this profile's signature appears in the (already lowercased) text.
    pub fn matches_signature(&self, haystack_lower: &str) -> bool {
        self.signature.matches(haystack_lower)
    }

    pub fn card_last4_patterns(&self) -> &PatternSet {
        &self.card_last4
    }

    pub fn billing_cycle_patterns(&self) -> &PatternSet {
        &self.billing_cycle
    }

    pub fn payment_due_date_patterns(&self) -> &PatternSet {
        &self.payment_due_date
    }

    pub fn total_amount_due_patterns(&self) -> &PatternSet {
        &self.total_amount_due
    }

    pub fn date_order(&self) -> DateOrder {
        self.date_order
    }

    pub fn sign_policy(&self) -> SignPolicy {
        self.sign_policy
    }

    pub fn grammar(&self) -> &LineGrammar {
        &self.grammar
    }

    /// False when the profile carries no field patterns at all.
    pub fn has_field_patterns(&self) -> bool {
        !(self.card_last4.is_empty()
            && self.billing_cycle.is_empty()
            && self.payment_due_date.is_empty()
            && self.total_amount_due.is_empty())
    }
}

/// Ordered, read-only collection of bank profiles.
///
/// Registration order is detection priority: the first profile whose
/// signature matches wins, so more specific signatures go first.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: Vec<BankProfile>,
}

impl ProfileRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in issuers: HDFC, ICICI, SBI Card, Axis, Kotak.
    pub fn builtin() -> Self {
        Self::from_specs(builtin_specs()).expect("built-in bank profiles are valid")
    }

    /// Build a registry from specs, in the given order.
    pub fn from_specs(specs: impl IntoIterator<Item = ProfileSpec>) -> Result<Self, ProfileError> {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec.compile()?)?;
        }
        Ok(registry)
    }

    /// Append a compiled profile at the lowest priority.
    pub fn register(&mut self, profile: BankProfile) -> Result<(), ProfileError> {
        if self.get(profile.name()).is_some() {
            return Err(ProfileError::DuplicateProfile(profile.name().to_string()));
        }
        debug!("Registered bank profile {} at priority {}", profile.name(), self.profiles.len());
        self.profiles.push(profile);
        Ok(())
    }

    /// Builder-style variant of [`register`](Self::register) taking a spec.
    pub fn with_profile(mut self, spec: &ProfileSpec) -> Result<Self, ProfileError> {
        self.register(spec.compile()?)?;
        Ok(self)
    }

    /// Look up a profile by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&BankProfile> {
        self.profiles.iter().find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Profiles in detection order.
    pub fn iter(&self) -> impl Iterator<Item = &BankProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
