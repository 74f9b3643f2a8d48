use std::sync::Arc;

use models::{
    CompositeBestSeller, DashboardOverview, MonthlyQuantity, MonthlyRevenue, MonthlySelling,
    OrderCount, ProductInfo, ProductStat,
};
use tracing::{debug, info, instrument};

use crate::errors::AggregationError;
use crate::merge::{self, JoinOptions};
use crate::upstream::{endpoints, FanoutClient};

/// Aggregate views of the admin dashboard.
///
/// Each view is a fixed pipeline of upstream calls. Any failing call fails the
/// whole view; a view never returns partial data.
#[derive(Clone)]
pub struct AdminDashboardService {
    client: Arc<FanoutClient>,
    join: JoinOptions,
}

impl AdminDashboardService {
    pub fn new(client: Arc<FanoutClient>) -> Self {
        Self { client, join: JoinOptions::default() }
    }

    pub fn with_join_options(mut self, join: JoinOptions) -> Self {
        self.join = join;
        self
    }

    pub fn join_options(&self) -> JoinOptions {
        self.join
    }

    #[instrument(skip(self))]
    pub async fn monthly_sum_total(&self) -> Result<Vec<MonthlyRevenue>, AggregationError> {
        Ok(self.client.fetch(endpoints::MONTHLY_SUM_TOTAL).await?)
    }

    #[instrument(skip(self))]
    pub async fn monthly_sum_qty(&self) -> Result<Vec<MonthlyQuantity>, AggregationError> {
        Ok(self.client.fetch(endpoints::MONTHLY_SUM_QTY).await?)
    }

    #[instrument(skip(self))]
    pub async fn order_summary(&self) -> Result<Vec<OrderCount>, AggregationError> {
        Ok(self.client.fetch(endpoints::ORDER_SUMMARY).await?)
    }

    #[instrument(skip(self))]
    pub async fn monthly_selling(&self) -> Result<Vec<MonthlySelling>, AggregationError> {
        Ok(self.client.fetch(endpoints::MONTHLY_SELLING).await?)
    }

    #[instrument(skip(self))]
    pub async fn total_customers(&self) -> Result<i64, AggregationError> {
        Ok(self.client.fetch(endpoints::TOTAL_CUSTOMERS).await?)
    }

    /// Best-seller stats from the order service, joined with name and rating
    /// from the product service.
    ///
    /// The product lookup depends on the ids of the first call, so the two
    /// calls run in sequence. A failed stats call means the lookup is never
    /// issued; an empty stats list skips the lookup.
    #[instrument(skip(self))]
    pub async fn best_selling_products(&self) -> Result<Vec<CompositeBestSeller>, AggregationError> {
        let stats: Vec<ProductStat> = self.client.fetch(endpoints::BEST_SELLING).await?;
        let ids = merge::product_ids(&stats);
        if ids.is_empty() {
            debug!("no best sellers; product lookup skipped");
            return Ok(Vec::new());
        }

        let infos: Vec<ProductInfo> = self
            .client
            .fetch_with_body(endpoints::PRODUCT_INFO, &ids)
            .await?;
        let composites = merge::merge_best_sellers(&stats, &infos, self.join)?;
        info!(stats = stats.len(), infos = infos.len(), rows = composites.len(), "best_sellers_merged");
        Ok(composites)
    }

    /// Every independent view in one round trip. The five calls run
    /// concurrently; the first error drops the others.
    #[instrument(skip(self))]
    pub async fn dashboard_overview(&self) -> Result<DashboardOverview, AggregationError> {
        let (monthly_sum_total, monthly_sum_qty, order_summary, monthly_selling, total_customers) = tokio::try_join!(
            self.monthly_sum_total(),
            self.monthly_sum_qty(),
            self.order_summary(),
            self.monthly_selling(),
            self.total_customers(),
        )?;
        Ok(DashboardOverview {
            monthly_sum_total,
            monthly_sum_qty,
            order_summary,
            monthly_selling,
            total_customers,
        })
    }
}
