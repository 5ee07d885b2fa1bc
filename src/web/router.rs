use log::{info, warn};
use std::collections::HashMap;

use crate::api::{DataServices, PredictionQuery};
use crate::metrics::PAGE_RENDERS;
use crate::tokens::{Page, TokenId};
use crate::views::{landing, token};

/// Query parameters the index route understands; everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub student: Option<String>,
    pub date: Option<String>,
    pub source: Option<String>,
}

impl PageQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |key: &str| params.get(key).cloned();
        Self {
            student: get(landing::SELECTOR_PARAM),
            date: get("date"),
            source: get("source"),
        }
    }

    pub fn prediction_query(&self) -> PredictionQuery {
        PredictionQuery::from_params(self.date.as_deref(), self.source.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Token(TokenId),
    NotFound(String),
}

impl Route {
    /// A missing or blank selector is the landing page; anything unknown is
    /// `NotFound`, which still renders the landing page.
    pub fn resolve(selector: Option<&str>) -> Self {
        match selector.map(str::trim).filter(|s| !s.is_empty()) {
            None => Route::Landing,
            Some(selector) => match TokenId::from_selector(selector) {
                Some(token) => Route::Token(token),
                None => Route::NotFound(selector.to_string()),
            },
        }
    }

    pub fn page(&self) -> Page {
        match self {
            Route::Token(token) => Page::Token(*token),
            Route::Landing | Route::NotFound(_) => Page::Landing,
        }
    }

    fn metric_label(&self) -> &'static str {
        match self {
            Route::NotFound(_) => "not_found",
            other => other.page().label(),
        }
    }
}

pub async fn render_page(services: &DataServices, query: &PageQuery) -> String {
    let route = Route::resolve(query.student.as_deref());
    PAGE_RENDERS.with_label_values(&[route.metric_label()]).inc();

    match &route {
        Route::Landing => landing::render(None),
        Route::NotFound(selector) => {
            warn!("Unknown page selector {:?}", selector);
            landing::render(Some(selector))
        }
        Route::Token(token_id) => {
            let prediction_query = query.prediction_query();
            // detached; the handle is dropped on purpose
            let _ = services.prediction(*token_id).warm_up(&prediction_query);

            info!("Rendering {} page for {}", token_id, prediction_query.date);
            let data = token::load(services, *token_id, prediction_query).await;
            token::render(token_id.profile(), &data)
        }
    }
}
