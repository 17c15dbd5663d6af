use async_trait::async_trait;

use crate::api::Resource;
use crate::view::{section, RenderError, ViewContext, ViewModule};

/// Lists one REST collection and shows how many records it holds.
pub struct ResourceView {
    resource: Resource,
}

impl ResourceView {
    pub fn new(resource: Resource) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }
}

#[async_trait]
impl ViewModule for ResourceView {
    fn name(&self) -> &str {
        self.resource.view()
    }

    async fn init(&self, ctx: &ViewContext) -> Result<(), RenderError> {
        let records = ctx.app.api.list(self.resource).await?;
        if !ctx.is_current() {
            return Ok(());
        }
        tracing::debug!(view = %ctx.view, records = records.len(), "Collection loaded");
        ctx.mount.append(&section(
            &format!("{}-resumen", self.resource.view()),
            &record_count(records.len()),
        ));
        Ok(())
    }
}

fn record_count(count: usize) -> String {
    let noun = if count == 1 { "registro" } else { "registros" };
    format!(r#"<p class="record-count" data-count="{count}">{count} {noun}</p>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_count_markup() {
        assert_eq!(
            record_count(3),
            r#"<p class="record-count" data-count="3">3 registros</p>"#
        );
        assert!(record_count(1).contains("1 registro<"));
    }
}
