// daml-sast-core/src/rules/catalog/keys.rs
// ============================================================================
// Module: Key Rules
// Description: Contract-key maintainer alignment.
// Purpose: Flag keys maintained by parties outside the signatories.
// Dependencies: crate::analysis
// ============================================================================

//! ## Overview
//! Maintainers are inferred with the key body substituted for the
//! maintainer function's parameter, then compared with the signatories.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::analysis::party::SubsetVerdict;
use crate::analysis::party::infer_maintainers;
use crate::analysis::party::infer_party_set;
use crate::findings::model::Category;
use crate::findings::model::Confidence;
use crate::findings::model::Evidence;
use crate::findings::model::Severity;
use crate::ir::model::Template;
use crate::rules::base::Rule;
use crate::rules::base::RuleError;
use crate::rules::base::RuleMeta;
use crate::rules::catalog::template_location;
use crate::walker::Ctx;
use crate::walker::Emitter;
use crate::walker::FindingDraft;

// ============================================================================
// SECTION: DAML-KEY-001
// ============================================================================

/// Metadata of `DAML-KEY-001`.
static MAINTAINER_ALIGNMENT: RuleMeta = RuleMeta {
    id: "DAML-KEY-001",
    title: "Key maintainers not aligned with signatories",
    description: "Key maintainers are not a subset of template signatories.",
    severity: Severity::Medium,
    confidence: Confidence::Medium,
    category: Category::Key,
    tags: &["key", "authorization"],
    rationale: "Maintainers who are not signatories can look up or fetch by key contracts they \
                never authorized.",
};

/// Key maintainers definitely outside the signatories.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintainerAlignment;

impl Rule for MaintainerAlignment {
    fn meta(&self) -> &'static RuleMeta {
        &MAINTAINER_ALIGNMENT
    }

    fn visit_template(
        &self,
        ctx: &Ctx<'_>,
        template: &Template,
        emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        let Some(key) = &template.key else {
            return Ok(());
        };
        let maintainers = infer_maintainers(key);
        let signatories = infer_party_set(&template.signatories);
        if maintainers.is_subset_of(&signatories) != SubsetVerdict::False {
            return Ok(());
        }
        let location = template_location(ctx, template, Some(&key.maintainers));
        emit.emit(
            FindingDraft::new("Key maintainers are not a subset of signatories.", location)
                .with_metadata("template", template.name.as_str())
                .with_evidence(Evidence::at(
                    "key",
                    "maintainers expression",
                    &key.maintainers.lf_ref,
                )),
        )
    }
}
