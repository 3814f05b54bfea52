use std::collections::HashSet;

use anyhow::Context as _;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

use cisne_api_schema::{course_invoices, invoices, service_invoices};
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;

use crate::domain::repository::InvoiceRepository;
use crate::domain::types::{Invoice, InvoiceFilter, InvoiceKind, InvoicePatch, NewInvoice};
use crate::error::ApiError;
use crate::infra::{internal, txn_error, update_error, write_error};

#[derive(Clone)]
pub struct DbInvoiceRepository {
    pub db: DatabaseConnection,
}

impl DbInvoiceRepository {
    /// Attach the sub-table kind to each invoice row.
    async fn with_kinds(&self, models: Vec<invoices::Model>) -> Result<Vec<Invoice>, ApiError> {
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let service_ids: HashSet<i32> = service_invoices::Entity::find()
            .filter(service_invoices::Column::InvoiceId.is_in(ids.clone()))
            .all(&self.db)
            .await
            .context("load service invoice ids")?
            .into_iter()
            .map(|m| m.invoice_id)
            .collect();
        let course_ids: HashSet<i32> = course_invoices::Entity::find()
            .filter(course_invoices::Column::InvoiceId.is_in(ids))
            .all(&self.db)
            .await
            .context("load course invoice ids")?
            .into_iter()
            .map(|m| m.invoice_id)
            .collect();
        Ok(models
            .into_iter()
            .map(|m| {
                let kind = if service_ids.contains(&m.id) {
                    Some(InvoiceKind::Service)
                } else if course_ids.contains(&m.id) {
                    Some(InvoiceKind::Course)
                } else {
                    None
                };
                invoice_from_model(m, kind)
            })
            .collect())
    }
}

impl InvoiceRepository for DbInvoiceRepository {
    async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, ApiError> {
        let mut query = invoices::Entity::find();
        match filter.kind {
            Some(InvoiceKind::Service) => {
                query = query.filter(
                    invoices::Column::Id.in_subquery(
                        Query::select()
                            .column(service_invoices::Column::InvoiceId)
                            .from(service_invoices::Entity)
                            .to_owned(),
                    ),
                );
            }
            Some(InvoiceKind::Course) => {
                query = query.filter(
                    invoices::Column::Id.in_subquery(
                        Query::select()
                            .column(course_invoices::Column::InvoiceId)
                            .from(course_invoices::Entity)
                            .to_owned(),
                    ),
                );
            }
            None => {}
        }
        if let Some(status) = &filter.payment_status {
            query = query.filter(invoices::Column::PaymentStatus.eq(status.as_str()));
        }
        if let Some(method) = &filter.payment_method {
            query = query.filter(invoices::Column::PaymentMethod.eq(method.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(invoices::Column::InvoiceDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(invoices::Column::InvoiceDate.lte(to));
        }
        let models = query
            .order_by_asc(invoices::Column::InvoiceDate)
            .order_by_asc(invoices::Column::Id)
            .all(&self.db)
            .await
            .context("list invoices")?;
        self.with_kinds(models).await
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Invoice>, ApiError> {
        let Some(model) = invoices::Entity::find_by_id(id.get())
            .one(&self.db)
            .await
            .context("find invoice by id")?
        else {
            return Ok(None);
        };
        Ok(self.with_kinds(vec![model]).await?.pop())
    }

    async fn create(
        &self,
        invoice: &NewInvoice,
        kind: Option<InvoiceKind>,
    ) -> Result<Invoice, ApiError> {
        let model = self
            .db
            .transaction::<_, invoices::Model, ApiError>(|txn| {
                let invoice = invoice.clone();
                Box::pin(async move {
                    let model = invoices::ActiveModel {
                        number: Set(invoice.number),
                        invoice_date: Set(invoice.date),
                        tax_amount: Set(invoice.tax_amount),
                        payment_method: Set(invoice.payment_method),
                        payment_status: Set(invoice.payment_status),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(|e| write_error(e, ApiError::InvoiceNumberTaken, "insert invoice"))?;

                    match kind {
                        Some(InvoiceKind::Service) => {
                            service_invoices::Entity::insert(service_invoices::ActiveModel {
                                invoice_id: Set(model.id),
                            })
                            .exec_without_returning(txn)
                            .await
                            .map_err(|e| internal(e, "insert service invoice"))?;
                        }
                        Some(InvoiceKind::Course) => {
                            course_invoices::Entity::insert(course_invoices::ActiveModel {
                                invoice_id: Set(model.id),
                            })
                            .exec_without_returning(txn)
                            .await
                            .map_err(|e| internal(e, "insert course invoice"))?;
                        }
                        None => {}
                    }
                    Ok(model)
                })
            })
            .await
            .map_err(|e| txn_error(e, "create invoice"))?;
        Ok(invoice_from_model(model, kind))
    }

    async fn update(&self, id: EntityId, patch: &InvoicePatch) -> Result<Invoice, ApiError> {
        let mut am = invoices::ActiveModel {
            id: Set(id.get()),
            ..Default::default()
        };
        if let Some(number) = &patch.number {
            am.number = Set(number.clone());
        }
        if let Some(date) = patch.date {
            am.invoice_date = Set(date);
        }
        if let Some(tax_amount) = patch.tax_amount {
            am.tax_amount = Set(Some(tax_amount));
        }
        if let Some(method) = &patch.payment_method {
            am.payment_method = Set(Some(method.clone()));
        }
        if let Some(status) = &patch.payment_status {
            am.payment_status = Set(Some(status.clone()));
        }
        let model = am.update(&self.db).await.map_err(|e| {
            update_error(
                e,
                ApiError::NotFound(EntityKind::Invoice),
                Some(ApiError::InvoiceNumberTaken),
                "update invoice",
            )
        })?;
        let mut updated = self.with_kinds(vec![model]).await?;
        updated
            .pop()
            .ok_or(ApiError::NotFound(EntityKind::Invoice))
    }

    async fn delete(&self, id: EntityId) -> Result<bool, ApiError> {
        let result = invoices::Entity::delete_by_id(id.get())
            .exec(&self.db)
            .await
            .context("delete invoice")?;
        Ok(result.rows_affected > 0)
    }
}

fn invoice_from_model(model: invoices::Model, kind: Option<InvoiceKind>) -> Invoice {
    Invoice {
        id: EntityId::new(model.id),
        kind,
        number: model.number,
        date: model.invoice_date,
        tax_amount: model.tax_amount,
        payment_method: model.payment_method,
        payment_status: model.payment_status,
    }
}
