use std::path::Path;

use serde::Deserialize;

use crate::services::auth::Role;
use crate::services::routing::{PathPattern, RouteRuleError, pattern::Captures};

/// Which oracle verifies ownership, and which placeholder holds the resource id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OwnershipScope {
    pub resource: String,
    pub param: String,
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pattern: PathPattern,
    min_role: Role,
    authenticated: bool,
    ownership: Option<OwnershipScope>,
}

impl RouteRule {
    pub fn new(pattern: &str, min_role: Role) -> Result<Self, RouteRuleError> {
        Ok(Self {
            pattern: PathPattern::parse(pattern)?,
            min_role,
            authenticated: false,
            ownership: None,
        })
    }

    /// Route needs *some* identity even though its minimum role is `User`.
    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    pub fn owned(mut self, resource: &str, param: &str) -> Self {
        self.ownership = Some(OwnershipScope {
            resource: resource.to_string(),
            param: param.to_string(),
        });
        self
    }

    fn fallback() -> Self {
        Self {
            pattern: PathPattern::any(),
            min_role: Role::User,
            authenticated: false,
            ownership: None,
        }
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn min_role(&self) -> Role {
        self.min_role
    }

    pub fn ownership(&self) -> Option<&OwnershipScope> {
        self.ownership.as_ref()
    }

    /// Whether the authentication gate must see a bound identity.
    pub fn requires_identity(&self) -> bool {
        self.authenticated || self.min_role > Role::User
    }

    fn validate(&self) -> Result<(), RouteRuleError> {
        if let Some(scope) = &self.ownership {
            if self.min_role != Role::Merchant {
                return Err(RouteRuleError::OwnershipRequiresMerchant {
                    pattern: self.pattern.to_string(),
                });
            }
            if !self.pattern.has_param(&scope.param) {
                return Err(RouteRuleError::UnknownParam {
                    pattern: self.pattern.to_string(),
                    param: scope.param.clone(),
                });
            }
        }
        Ok(())
    }
}

/// JSON shape of one rule in `ROUTE_RULES_PATH`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteRuleConfig {
    pattern: String,
    min_role: Role,
    #[serde(default)]
    authenticated: bool,
    #[serde(default)]
    ownership: Option<OwnershipScope>,
}

impl TryFrom<RouteRuleConfig> for RouteRule {
    type Error = RouteRuleError;

    fn try_from(c: RouteRuleConfig) -> Result<Self, Self::Error> {
        let mut rule = RouteRule::new(&c.pattern, c.min_role)?;
        rule.authenticated = c.authenticated;
        rule.ownership = c.ownership;
        Ok(rule)
    }
}

/// Static route classification. First matching rule wins; no match falls back
/// to a `User` rule without identity requirement.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    fallback: RouteRule,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> Result<Self, RouteRuleError> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self {
            rules,
            fallback: RouteRule::fallback(),
        })
    }

    pub fn builtin() -> Result<Self, RouteRuleError> {
        Self::new(vec![
            RouteRule::new("/shopManage/{id}/**", Role::Merchant)?.owned("shop", "id"),
            RouteRule::new("/shopManage/**", Role::Merchant)?,
            RouteRule::new("/merchant/**", Role::Merchant)?,
            RouteRule::new("/admin/**", Role::Admin)?,
            RouteRule::new("/system/**", Role::Admin)?,
            RouteRule::new("/user/me", Role::User)?.authenticated(),
            RouteRule::new("/user/logout", Role::User)?.authenticated(),
        ])
    }

    pub fn from_json(json: &str) -> Result<Self, RouteRuleError> {
        let configs: Vec<RouteRuleConfig> = serde_json::from_str(json)?;
        let rules = configs
            .into_iter()
            .map(RouteRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RouteRuleError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Resource kinds named by ownership-scoped rules.
    pub fn ownership_resources(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter_map(|r| r.ownership.as_ref())
            .map(|scope| scope.resource.as_str())
    }

    pub fn resolve(&self, path: &str) -> RouteMatch<'_> {
        self.rules
            .iter()
            .find_map(|rule| {
                rule.pattern.matches(path).map(|captures| RouteMatch {
                    rule,
                    captures,
                    is_fallback: false,
                })
            })
            .unwrap_or(RouteMatch {
                rule: &self.fallback,
                captures: Captures::new(),
                is_fallback: true,
            })
    }
}

/// Why the resource id of an ownership-scoped route could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceIdError {
    #[error("route is not ownership-scoped")]
    NotOwnershipScoped,
    #[error("placeholder '{0}' was not captured")]
    MissingParam(String),
    #[error("placeholder '{param}' value '{value}' is not a resource id")]
    Unparseable { param: String, value: String },
}

impl ResourceIdError {
    pub fn reason(&self) -> &'static str {
        match self {
            ResourceIdError::NotOwnershipScoped => "not_ownership_scoped",
            ResourceIdError::MissingParam(_) => "missing_param",
            ResourceIdError::Unparseable { .. } => "unparseable_resource_id",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteMatch<'t> {
    rule: &'t RouteRule,
    captures: Captures,
    is_fallback: bool,
}

impl<'t> RouteMatch<'t> {
    pub fn rule(&self) -> &'t RouteRule {
        self.rule
    }

    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.captures
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Resource id addressed by an ownership-scoped route.
    pub fn resource_id(&self) -> Result<i64, ResourceIdError> {
        let scope = self
            .rule
            .ownership()
            .ok_or(ResourceIdError::NotOwnershipScoped)?;
        let value = self
            .param(&scope.param)
            .ok_or_else(|| ResourceIdError::MissingParam(scope.param.clone()))?;

        value
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ResourceIdError::Unparseable {
                param: scope.param.clone(),
                value: value.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::builtin().unwrap()
    }

    #[test]
    fn builtin_table_classifies_prefixes() {
        let t = table();
        let cases = [
            ("/merchant/orders", Role::Merchant, true),
            ("/shopManage", Role::Merchant, true),
            ("/shopManage/42", Role::Merchant, true),
            ("/admin/users", Role::Admin, true),
            ("/system/config", Role::Admin, true),
            ("/user/me", Role::User, true),
            ("/shop/42", Role::User, false),
            ("/voucher/list/3", Role::User, false),
            ("/", Role::User, false),
        ];
        for (path, role, requires_identity) in cases {
            let m = t.resolve(path);
            assert_eq!(m.rule().min_role(), role, "{path}");
            assert_eq!(m.rule().requires_identity(), requires_identity, "{path}");
        }
        assert!(t.resolve("/shop/42").is_fallback());
    }

    #[test]
    fn only_shop_manage_with_id_is_ownership_scoped() {
        let t = table();
        assert_eq!(t.resolve("/shopManage/42").resource_id(), Ok(42));
        assert_eq!(t.resolve("/shopManage/42/vouchers/3").resource_id(), Ok(42));
        assert_eq!(
            t.resolve("/shopManage").resource_id(),
            Err(ResourceIdError::NotOwnershipScoped)
        );
        assert_eq!(
            t.resolve("/merchant/42").resource_id(),
            Err(ResourceIdError::NotOwnershipScoped)
        );
        assert_eq!(t.ownership_resources().collect::<Vec<_>>(), vec!["shop"]);
    }

    #[test]
    fn non_numeric_resource_ids_are_reported() {
        let err = table().resolve("/shopManage/abc").resource_id().unwrap_err();
        assert_eq!(err.reason(), "unparseable_resource_id");
        assert!(table().resolve("/shopManage/-3").resource_id().is_err());
    }

    #[test]
    fn rules_load_from_json() {
        let t = RouteTable::from_json(
            r#"[
                {"pattern": "/store/{storeId}/**", "minRole": 1,
                 "ownership": {"resource": "shop", "param": "storeId"}},
                {"pattern": "/ops/**", "minRole": 2},
                {"pattern": "/profile", "minRole": 0, "authenticated": true}
            ]"#,
        )
        .unwrap();

        assert_eq!(t.resolve("/store/9/items").resource_id(), Ok(9));
        assert_eq!(t.resolve("/ops").rule().min_role(), Role::Admin);
        assert!(t.resolve("/profile").rule().requires_identity());
        assert_eq!(t.rules().len(), 3);
    }

    #[test]
    fn invalid_rules_fail_to_load() {
        let wrong_role = RouteTable::new(vec![
            RouteRule::new("/x/{id}", Role::Admin)
                .unwrap()
                .owned("shop", "id"),
        ]);
        assert!(matches!(
            wrong_role,
            Err(RouteRuleError::OwnershipRequiresMerchant { .. })
        ));

        let missing_param = RouteTable::new(vec![
            RouteRule::new("/x/{id}", Role::Merchant)
                .unwrap()
                .owned("shop", "shopId"),
        ]);
        assert!(matches!(
            missing_param,
            Err(RouteRuleError::UnknownParam { .. })
        ));

        assert!(RouteTable::from_json(r#"[{"pattern": "/x", "minRole": 7}]"#).is_err());
    }
}
