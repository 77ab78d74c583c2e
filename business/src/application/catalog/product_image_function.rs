use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::catalog::product_image::ProductImageUrlProvider;
use crate::domain::chat::errors::ChatError;
use crate::domain::chat::model::FunctionDeclaration;
use crate::domain::chat::services::ChatFunction;

/// Lets the model link to a product's picture by catalog id.
pub struct GetProductImageUrlFunction {
    pub provider: Arc<ProductImageUrlProvider>,
}

#[async_trait]
impl ChatFunction for GetProductImageUrlFunction {
    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration {
            name: "get_product_image_url".to_string(),
            description: "Returns the URL of the picture of a catalog item.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "product_id": {
                        "type": "integer",
                        "description": "Catalog item id"
                    }
                },
                "required": ["product_id"]
            }),
        }
    }

    async fn invoke(&self, arguments: &serde_json::Value) -> Result<serde_json::Value, ChatError> {
        let product_id = match arguments.get("product_id") {
            Some(serde_json::Value::Number(n)) if n.is_u64() => n.to_string(),
            Some(serde_json::Value::String(s)) if s.parse::<u64>().is_ok() => s.clone(),
            _ => {
                return Err(ChatError::FunctionFailed(
                    "product_id must be a non-negative integer".to_string(),
                ));
            }
        };

        let url = self
            .provider
            .image_url(&product_id)
            .map_err(|e| ChatError::FunctionFailed(e.to_string()))?;

        Ok(json!(url))
    }
}
