//! Rule matching.
//!
//! Pure functions deciding whether a single [`PolicyRule`] grants a
//! requested action. No I/O and no state; everything here is safe to call
//! from any number of threads.
//!
//! # Resource specifiers
//!
//! | Specifier   | Matches                                          |
//! |-------------|--------------------------------------------------|
//! | `*`         | any resource, with or without a subresource      |
//! | `pods`      | exactly `pods`                                   |
//! | `pods/log`  | exactly `pods` with subresource `log`            |
//! | `pods/*`    | `pods` with any subresource (or none)            |
//! | `*/scale`   | any resource with subresource `scale`            |
//!
//! No other wildcard forms exist; everything else is an exact comparison.
//!
//! # Non-resource paths
//!
//! A pattern is either `*`, an exact path, or a prefix followed by a
//! trailing `*` (`/api/*`). Wildcards anywhere else are literal.

use warden_core::{
    API_GROUP_ALL, Action, NON_RESOURCE_ALL, PolicyRule, RESOURCE_ALL, ResourceAttributes,
    VERB_ALL,
};

/// Whether `rule` grants `action`.
///
/// The verb is checked first. Resource actions are then matched against
/// the rule's resource fields and non-resource actions against its path
/// patterns; a rule is never checked against both shapes in one call.
pub fn rule_matches_request(rule: &PolicyRule, action: &Action) -> bool {
    if !verb_matches(rule, action.verb()) {
        return false;
    }

    match action {
        Action::Resource(attrs) => rule_matches_resources(rule, attrs),
        Action::NonResource(attrs) => rule_matches_non_resource(rule, &attrs.path),
    }
}

/// Whether `rule` lists `verb` or the all-verbs marker.
pub fn verb_matches(rule: &PolicyRule, verb: &str) -> bool {
    has_string(&rule.verbs, verb) || has_string(&rule.verbs, VERB_ALL)
}

/// Whether `rule` lists `api_group` or the all-groups marker.
pub fn api_group_matches(rule: &PolicyRule, api_group: &str) -> bool {
    has_string(&rule.api_groups, api_group) || has_string(&rule.api_groups, API_GROUP_ALL)
}

/// Whether `rule` grants the resource described by `attrs`.
///
/// Ignores the verb; see [`rule_matches_request`].
pub fn rule_matches_resources(rule: &PolicyRule, attrs: &ResourceAttributes) -> bool {
    if attrs.resource.is_empty() {
        return false;
    }

    if !api_group_matches(rule, &attrs.api_group) {
        return false;
    }

    // An empty name list places no restriction on names.
    if !rule.resource_names.is_empty() && !has_string(&rule.resource_names, &attrs.name) {
        return false;
    }

    rule.resources
        .iter()
        .any(|spec| resource_matches(spec, &attrs.resource, &attrs.subresource))
}

/// Whether a single resource specifier covers `resource` / `subresource`.
pub fn resource_matches(spec: &str, resource: &str, subresource: &str) -> bool {
    if spec == RESOURCE_ALL {
        return true;
    }

    // Exact "resource" or "resource/subresource".
    let exact = if subresource.is_empty() {
        spec == resource
    } else {
        spec.strip_prefix(resource)
            .and_then(|rest| rest.strip_prefix('/'))
            == Some(subresource)
    };
    if exact {
        return true;
    }

    // "*/subresource"
    if !subresource.is_empty() && spec.strip_prefix("*/") == Some(subresource) {
        return true;
    }

    // "resource/*"
    spec.strip_suffix("/*") == Some(resource)
}

/// Whether `rule` grants the non-resource `path`.
///
/// Ignores the verb; see [`rule_matches_request`].
pub fn rule_matches_non_resource(rule: &PolicyRule, path: &str) -> bool {
    if path.is_empty() {
        return false;
    }

    rule.non_resource_urls
        .iter()
        .any(|spec| path_matches(path, spec))
}

/// Whether the path pattern `spec` covers `path`.
pub fn path_matches(path: &str, spec: &str) -> bool {
    if spec == NON_RESOURCE_ALL || spec == path {
        return true;
    }

    spec.ends_with('*') && path.starts_with(spec.trim_end_matches('*'))
}

fn has_string(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item == value)
}
