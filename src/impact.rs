//! ImpactClassifier (§4.2, component C2): the single source of truth for
//! mapping a change's attributes onto an [`Impact`] and its caveats.
//!
//! Rendering layers read `Change::impact`/`Change::caveats`; nothing outside
//! this module is allowed to re-derive them (§4.2 "Implementers MUST keep
//! this table in one place").

use crate::config::{ImpactFilter, ImpactSettings};
use crate::model::{Change, ChangeKind, Impact, Visibility};

/// The attribute deltas the classifier decides on (§4.2 "Inputs").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttributeDeltas {
    pub signature_changed: bool,
    pub parameter_renamed: bool,
    pub return_type_changed: bool,
    pub member_removed: bool,
    pub body_only_changed: bool,
    pub whitespace_only: bool,
    pub comment_only: bool,
}

/// Result of classification: the impact plus any caveats to attach.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub impact: Impact,
    pub caveats: Vec<&'static str>,
}

/// Apply the §4.2 decision table. First match wins.
#[must_use]
pub fn classify(
    change_kind: ChangeKind,
    visibility: Visibility,
    deltas: AttributeDeltas,
) -> Classification {
    if deltas.whitespace_only || deltas.comment_only {
        return Classification {
            impact: Impact::FormattingOnly,
            caveats: Vec::new(),
        };
    }

    if visibility == Visibility::Public
        && (deltas.signature_changed || deltas.member_removed || deltas.return_type_changed)
    {
        return Classification {
            impact: Impact::BreakingPublicApi,
            caveats: vec!["Signature change breaks external consumers"],
        };
    }

    if visibility == Visibility::Public && deltas.parameter_renamed {
        return Classification {
            impact: Impact::BreakingPublicApi,
            caveats: vec!["Parameter rename may break named-argument callers"],
        };
    }

    if matches!(visibility, Visibility::Internal | Visibility::Protected)
        && (deltas.signature_changed || deltas.member_removed)
    {
        return Classification {
            impact: Impact::BreakingInternalApi,
            caveats: Vec::new(),
        };
    }

    if change_kind == ChangeKind::Added && visibility == Visibility::Public {
        return Classification {
            impact: Impact::NonBreaking,
            caveats: Vec::new(),
        };
    }

    if deltas.body_only_changed && visibility != Visibility::Public {
        return Classification {
            impact: Impact::NonBreaking,
            caveats: Vec::new(),
        };
    }

    Classification {
        impact: Impact::NonBreaking,
        caveats: Vec::new(),
    }
}

/// `true` if `impact` should survive the §6 `impact_filter` /
/// `include_non_impactful` / `include_formatting` settings.
fn passes(impact: Impact, settings: &ImpactSettings) -> bool {
    let min_severity = match settings.filter {
        ImpactFilter::BreakingPublic => Impact::BreakingPublicApi.severity(),
        ImpactFilter::BreakingInternal => Impact::BreakingInternalApi.severity(),
        ImpactFilter::NonBreaking => Impact::NonBreaking.severity(),
        ImpactFilter::All => 0,
    };
    if impact.severity() < min_severity {
        return false;
    }
    match impact {
        Impact::FormattingOnly => settings.include_formatting,
        Impact::NonBreaking => settings.include_non_impactful,
        Impact::BreakingInternalApi | Impact::BreakingPublicApi => true,
    }
}

/// Apply §6's `impact_filter`/`include_non_impactful`/`include_formatting`
/// to a change tree (§8 scenario 3: a `.cs` whitespace-only edit must
/// produce *zero* changes under the default filter, not just hide its
/// impact label).
///
/// A `Modified` wrapper the differ only emitted to preserve containment
/// around now-filtered-out children (§4.4 step 5 "skip the parent, keep the
/// kids" — so its own impact is the classifier's unconditional default,
/// `NonBreaking`) is dropped along with them rather than left behind as an
/// empty husk; anything else that fails the filter has its surviving
/// children spliced up in its place.
#[must_use]
pub fn filter_changes(changes: Vec<Change>, settings: &ImpactSettings) -> Vec<Change> {
    changes.into_iter().flat_map(|c| filter_one(c, settings)).collect()
}

fn filter_one(mut change: Change, settings: &ImpactSettings) -> Vec<Change> {
    let had_children = !change.children.is_empty();
    change.children = filter_changes(change.children, settings);

    let is_empty_wrapper = had_children
        && change.children.is_empty()
        && change.kind == ChangeKind::Modified
        && change.impact == Impact::NonBreaking;
    if is_empty_wrapper {
        return Vec::new();
    }

    if passes(change.impact, settings) {
        vec![change]
    } else {
        change.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_wins_regardless_of_visibility() {
        let deltas = AttributeDeltas {
            whitespace_only: true,
            signature_changed: true,
            ..Default::default()
        };
        let result = classify(ChangeKind::Modified, Visibility::Public, deltas);
        assert_eq!(result.impact, Impact::FormattingOnly);
        assert!(result.caveats.is_empty());
    }

    #[test]
    fn public_signature_change_is_breaking() {
        let deltas = AttributeDeltas {
            signature_changed: true,
            ..Default::default()
        };
        let result = classify(ChangeKind::Modified, Visibility::Public, deltas);
        assert_eq!(result.impact, Impact::BreakingPublicApi);
        assert_eq!(
            result.caveats,
            vec!["Signature change breaks external consumers"]
        );
    }

    #[test]
    fn public_parameter_rename_has_specific_caveat() {
        let deltas = AttributeDeltas {
            parameter_renamed: true,
            ..Default::default()
        };
        let result = classify(ChangeKind::Modified, Visibility::Public, deltas);
        assert_eq!(result.impact, Impact::BreakingPublicApi);
        assert_eq!(
            result.caveats,
            vec!["Parameter rename may break named-argument callers"]
        );
    }

    #[test]
    fn internal_signature_change_is_breaking_internal() {
        let deltas = AttributeDeltas {
            signature_changed: true,
            ..Default::default()
        };
        let result = classify(ChangeKind::Modified, Visibility::Internal, deltas);
        assert_eq!(result.impact, Impact::BreakingInternalApi);
    }

    #[test]
    fn added_public_member_is_non_breaking() {
        let result = classify(ChangeKind::Added, Visibility::Public, AttributeDeltas::default());
        assert_eq!(result.impact, Impact::NonBreaking);
    }

    #[test]
    fn private_body_only_change_is_non_breaking() {
        let deltas = AttributeDeltas {
            body_only_changed: true,
            ..Default::default()
        };
        let result = classify(ChangeKind::Modified, Visibility::Private, deltas);
        assert_eq!(result.impact, Impact::NonBreaking);
    }

    #[test]
    fn default_case_is_non_breaking() {
        let result = classify(
            ChangeKind::Modified,
            Visibility::Private,
            AttributeDeltas::default(),
        );
        assert_eq!(result.impact, Impact::NonBreaking);
        assert!(result.caveats.is_empty());
    }

    fn leaf(kind: ChangeKind, impact: Impact) -> Change {
        Change::leaf(
            kind,
            crate::capability::NodeKind::Method,
            "Go",
            None,
            None,
            None,
            None,
            impact,
            Visibility::Public,
        )
    }

    #[test]
    fn default_settings_drop_formatting_only_wrapper_and_all() {
        let method = leaf(ChangeKind::Modified, Impact::FormattingOnly);
        let class = leaf(ChangeKind::Modified, Impact::NonBreaking).with_children(vec![method]);
        let filtered = filter_changes(vec![class], &ImpactSettings::default());
        assert!(filtered.is_empty());
    }

    #[test]
    fn include_formatting_keeps_the_formatting_leaf_and_its_wrapper() {
        let method = leaf(ChangeKind::Modified, Impact::FormattingOnly);
        let class = leaf(ChangeKind::Modified, Impact::NonBreaking).with_children(vec![method]);
        let settings = ImpactSettings {
            include_formatting: true,
            ..ImpactSettings::default()
        };
        let filtered = filter_changes(vec![class], &settings);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].children.len(), 1);
        assert_eq!(filtered[0].children[0].impact, Impact::FormattingOnly);
    }

    #[test]
    fn breaking_public_filter_drops_non_breaking_siblings() {
        let breaking = leaf(ChangeKind::Modified, Impact::BreakingPublicApi);
        let non_breaking = leaf(ChangeKind::Added, Impact::NonBreaking);
        let settings = ImpactSettings {
            filter: ImpactFilter::BreakingPublic,
            ..ImpactSettings::default()
        };
        let filtered = filter_changes(vec![breaking, non_breaking], &settings);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].impact, Impact::BreakingPublicApi);
    }

    #[test]
    fn a_real_change_surviving_under_a_dropped_child_is_spliced_up() {
        let formatting_child = leaf(ChangeKind::Modified, Impact::FormattingOnly);
        let breaking_child = leaf(ChangeKind::Added, Impact::BreakingPublicApi);
        let class = leaf(ChangeKind::Modified, Impact::BreakingPublicApi)
            .with_children(vec![formatting_child, breaking_child]);
        let settings = ImpactSettings {
            filter: ImpactFilter::NonBreaking,
            ..ImpactSettings::default()
        };
        let filtered = filter_changes(vec![class], &settings);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].children.len(), 1);
        assert_eq!(filtered[0].children[0].impact, Impact::BreakingPublicApi);
    }
}
