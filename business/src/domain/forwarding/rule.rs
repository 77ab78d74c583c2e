use url::Url;

use super::errors::ForwardingError;
use super::route_template::RouteTemplate;

/// Maps inbound paths matching one template onto a path under a fixed upstream.
#[derive(Debug, Clone)]
pub struct ForwardRule {
    inbound: RouteTemplate,
    upstream_base: Url,
    upstream_path: RouteTemplate,
}

impl ForwardRule {
    pub fn new(
        inbound: &str,
        upstream_base: Url,
        upstream_path: &str,
    ) -> Result<Self, ForwardingError> {
        let inbound = RouteTemplate::parse(inbound)?;
        let upstream_path = RouteTemplate::parse(upstream_path)?;

        if let Some(unknown) = upstream_path
            .parameters()
            .find(|p| !inbound.parameters().any(|q| q == *p))
        {
            return Err(ForwardingError::UnknownParameter(unknown.to_string()));
        }
        if upstream_base.cannot_be_a_base() {
            return Err(ForwardingError::InvalidTarget(upstream_base.to_string()));
        }

        Ok(Self {
            inbound,
            upstream_base,
            upstream_path,
        })
    }

    pub fn inbound(&self) -> &RouteTemplate {
        &self.inbound
    }

    /// Builds the upstream URL for an inbound request path and optional query string.
    pub fn resolve(&self, path: &str, query: Option<&str>) -> Result<Url, ForwardingError> {
        let values = self.inbound.matches(path).ok_or(ForwardingError::NoMatch)?;
        let rendered = self.upstream_path.render(&values)?;

        let mut target = format!(
            "{}{}",
            self.upstream_base.as_str().trim_end_matches('/'),
            rendered
        );
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }

        Url::parse(&target).map_err(|e| ForwardingError::InvalidTarget(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_rule() -> ForwardRule {
        ForwardRule::new(
            "/product-images/{id}",
            Url::parse("http://localhost:5301").unwrap(),
            "/api/catalog/items/{id}/pic",
        )
        .unwrap()
    }

    #[test]
    fn should_rewrite_product_image_path() {
        let target = catalog_rule().resolve("/product-images/42", None).unwrap();
        assert_eq!(target.as_str(), "http://localhost:5301/api/catalog/items/42/pic");
    }

    #[test]
    fn should_preserve_query_string() {
        let target = catalog_rule()
            .resolve("/product-images/42", Some("size=small"))
            .unwrap();
        assert_eq!(
            target.as_str(),
            "http://localhost:5301/api/catalog/items/42/pic?size=small"
        );
    }

    #[test]
    fn should_keep_upstream_base_path_prefix() {
        let rule = ForwardRule::new(
            "/product-images/{id}",
            Url::parse("http://catalog.internal/v2/").unwrap(),
            "/api/catalog/items/{id}/pic",
        )
        .unwrap();

        let target = rule.resolve("/product-images/9", None).unwrap();

        assert_eq!(target.as_str(), "http://catalog.internal/v2/api/catalog/items/9/pic");
    }

    #[test]
    fn should_fail_for_non_matching_path() {
        let err = catalog_rule().resolve("/products/42", None).unwrap_err();
        assert_eq!(err, ForwardingError::NoMatch);
    }

    #[test]
    fn should_refuse_dot_segment_ids_instead_of_leaving_the_image_path() {
        let rule = catalog_rule();

        for path in [
            "/product-images/.",
            "/product-images/..",
            "/product-images/%2e",
            "/product-images/%2E%2e",
        ] {
            assert_eq!(rule.resolve(path, None).unwrap_err(), ForwardingError::NoMatch);
        }
    }

    #[test]
    fn should_reject_upstream_parameter_missing_from_inbound() {
        let err = ForwardRule::new(
            "/product-images/{id}",
            Url::parse("http://localhost:5301").unwrap(),
            "/api/catalog/items/{itemId}/pic",
        )
        .unwrap_err();

        assert_eq!(err, ForwardingError::UnknownParameter("itemId".to_string()));
    }
}
