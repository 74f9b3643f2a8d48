use super::UpstreamService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// A fixed upstream contract: which service, which verb, which path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub service: UpstreamService,
    pub method: HttpMethod,
    pub path: &'static str,
}

impl Endpoint {
    pub const fn get(service: UpstreamService, path: &'static str) -> Self {
        Self { service, method: HttpMethod::Get, path }
    }

    pub const fn post(service: UpstreamService, path: &'static str) -> Self {
        Self { service, method: HttpMethod::Post, path }
    }
}

pub const MONTHLY_SUM_TOTAL: Endpoint = Endpoint::get(UpstreamService::Order, "/api/orders/getMonthlySumTotal");
pub const MONTHLY_SUM_QTY: Endpoint = Endpoint::get(UpstreamService::Order, "/api/orders/getMonthlySumQty");
// "Summery" is the order service's spelling.
pub const ORDER_SUMMARY: Endpoint = Endpoint::get(UpstreamService::Order, "/api/orders/orderSummery");
pub const MONTHLY_SELLING: Endpoint = Endpoint::get(UpstreamService::Order, "/api/orders/monthly-selling");
pub const BEST_SELLING: Endpoint = Endpoint::get(UpstreamService::Order, "/api/orders/best-selling");
pub const TOTAL_CUSTOMERS: Endpoint = Endpoint::get(UpstreamService::Customer, "/api/customers/total");
/// Body: JSON array of product ids. Answer: one `ProductInfo` per known id.
pub const PRODUCT_INFO: Endpoint = Endpoint::post(UpstreamService::Product, "/api/product/getInfo");
