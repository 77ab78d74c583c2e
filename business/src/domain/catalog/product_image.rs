use url::Url;

use crate::domain::forwarding::errors::ForwardingError;
use crate::domain::forwarding::route_template::{RouteTemplate, RouteValues};
use crate::domain::forwarding::rule::ForwardRule;

/// Public path under which product pictures are served by this front-end.
pub const PRODUCT_IMAGE_ROUTE: &str = "/product-images/{id}";
/// Path of the picture resource on the catalog service.
pub const CATALOG_IMAGE_PATH: &str = "/api/catalog/items/{id}/pic";

/// Forwarding rule from the public image route to the catalog service at `catalog_base`.
pub fn product_image_rule(catalog_base: Url) -> Result<ForwardRule, ForwardingError> {
    ForwardRule::new(PRODUCT_IMAGE_ROUTE, catalog_base, CATALOG_IMAGE_PATH)
}

/// Produces the public URL of a product's picture.
pub struct ProductImageUrlProvider {
    template: RouteTemplate,
}

impl ProductImageUrlProvider {
    pub fn new() -> Result<Self, ForwardingError> {
        Ok(Self {
            template: RouteTemplate::parse(PRODUCT_IMAGE_ROUTE)?,
        })
    }

    pub fn image_url(&self, product_id: &str) -> Result<String, ForwardingError> {
        let mut values = RouteValues::new();
        values.insert("id".to_string(), product_id.to_string());
        self.template.render(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_public_image_url() {
        let provider = ProductImageUrlProvider::new().unwrap();
        assert_eq!(provider.image_url("17").unwrap(), "/product-images/17");
    }

    #[test]
    fn should_forward_public_image_url_to_catalog() {
        let rule = product_image_rule(Url::parse("http://catalog-api:8080").unwrap()).unwrap();

        let target = rule.resolve("/product-images/17", None).unwrap();

        assert_eq!(target.as_str(), "http://catalog-api:8080/api/catalog/items/17/pic");
    }
}
