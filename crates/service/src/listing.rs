//! Paginated, filtered user listings.

use userward_access::{Action, Principal, authorize};
use userward_store::{SearchQuery, UserStore};

use crate::reply::{ListPage, ServiceError, UserSummary};
use crate::service::UserService;

/// Listing inputs: a raw search string and an offset into the result set.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub query: String,
    pub offset: usize,
}

impl ListParams {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            offset: 0,
        }
    }
}

impl<S: UserStore> UserService<S> {
    /// Full index listing.
    pub fn list(&self, principal: &Principal, params: ListParams) -> Result<ListPage, ServiceError> {
        self.page(principal, Action::List, params)
    }

    /// Raw page fragment for incremental scroll; same semantics as
    /// [`UserService::list`], gated separately.
    pub fn item_page(
        &self,
        principal: &Principal,
        params: ListParams,
    ) -> Result<ListPage, ServiceError> {
        self.page(principal, Action::ItemPage, params)
    }

    fn page(
        &self,
        principal: &Principal,
        action: Action,
        params: ListParams,
    ) -> Result<ListPage, ServiceError> {
        authorize(principal, action, None)?;

        // Malformed search syntax degrades to "show everyone visible" with a
        // non-fatal notice; it must never fail the request.
        let (query, warning) = match SearchQuery::parse(&params.query) {
            Ok(query) => (query, None),
            Err(err) => {
                tracing::warn!(
                    query = %params.query,
                    error = %err,
                    "malformed search query, falling back to unfiltered listing"
                );
                (
                    SearchQuery::empty(),
                    Some(format!("Invalid search query, showing all users: {err}")),
                )
            }
        };

        let matches = self.store().search(principal, &query)?;
        let total = matches.len();
        let users = matches
            .iter()
            .skip(params.offset)
            .take(principal.per_page as usize)
            .map(UserSummary::from)
            .collect();

        Ok(ListPage {
            users,
            total,
            warning,
        })
    }
}
