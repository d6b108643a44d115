//! SuperOps GraphQL client implementation

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::error;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{Value, json};

use super::models::{ConversationEvent, Page, RawTechnician, RawTicket};
use super::TicketSource;
use crate::config::SuperOpsConfig;
use crate::error::{ApiError, Result};

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client-side limit on requests to the SuperOps API
const RATE_LIMIT_PER_SECOND: u32 = 6;

/// Ticket fields requested from every ticket listing
const TICKET_FIELDS: &str = "
    ticketId
    displayId
    subject
    status
    priority
    technician
    requester
    client
    techGroup
    createdTime
    updatedTime
    firstResponseDueTime
    firstResponseTime
    firstResponseViolated
    resolutionDueTime
    resolutionTime
    resolutionViolated
    sla
    requestType
";

/// SuperOps GraphQL API client
pub struct SuperOpsClient {
    http: HttpClient,
    api_url: String,
    api_key: String,
    subdomain: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

/// GraphQL response envelope
#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,

    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

/// Page marker shared by all listing responses
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListInfo {
    has_more: bool,
}

impl SuperOpsClient {
    /// Create a new client from the SuperOps connection settings
    pub fn new(config: &SuperOpsConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap());
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            subdomain: config.customer_subdomain.clone(),
            rate_limiter,
        })
    }

    /// Execute a GraphQL query and return the `data` payload
    async fn post_graphql(&self, query: &str, variables: Value) -> Result<Value> {
        self.rate_limiter.until_ready().await;

        let payload = json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("CustomerSubDomain", &self.subdomain)
            .json(&payload)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()).into());
        }

        let envelope = response.json::<GraphQlResponse>().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        if let Some(first) = envelope.errors.first() {
            error!("GraphQL errors: {}", first.message);
            return Err(ApiError::GraphQl(first.message.clone()).into());
        }

        Ok(envelope.data.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl TicketSource for SuperOpsClient {
    async fn list_tickets(
        &self,
        page: usize,
        page_size: usize,
        exclude_statuses: &[String],
    ) -> Result<Page<RawTicket>> {
        #[derive(Debug, Default, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        struct TicketList {
            tickets: Vec<RawTicket>,
            list_info: ListInfo,
        }

        #[derive(Debug, Default, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        struct TicketListData {
            get_ticket_list: TicketList,
        }

        let query = format!(
            "query getTicketList($input: ListInfoInput!) {{
                getTicketList(input: $input) {{
                    tickets {{ {TICKET_FIELDS} }}
                    listInfo {{ page pageSize hasMore totalCount }}
                }}
            }}"
        );

        let variables = json!({
            "input": {
                "page": page,
                "pageSize": page_size,
                "condition": {
                    "attribute": "status",
                    "operator": "notIncludes",
                    "value": exclude_statuses,
                },
            }
        });

        let data = self.post_graphql(&query, variables).await?;
        let parsed: TicketListData = serde_json::from_value(data)
            .map_err(|e| ApiError::InvalidResponse(format!("Bad ticket list: {}", e)))?;

        Ok(Page {
            items: parsed.get_ticket_list.tickets,
            has_more: parsed.get_ticket_list.list_info.has_more,
        })
    }

    async fn list_technicians(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<Page<RawTechnician>> {
        #[derive(Debug, Default, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        struct TechnicianList {
            user_list: Vec<RawTechnician>,
            list_info: ListInfo,
        }

        #[derive(Debug, Default, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        struct TechnicianListData {
            get_technician_list: TechnicianList,
        }

        let query = "query getTechnicianList($input: ListInfoInput!) {
            getTechnicianList(input: $input) {
                userList { userId name }
                listInfo { page pageSize hasMore totalCount }
            }
        }";

        let variables = json!({
            "input": {
                "page": page,
                "pageSize": page_size,
            }
        });

        let data = self.post_graphql(query, variables).await?;
        let parsed: TechnicianListData = serde_json::from_value(data)
            .map_err(|e| ApiError::InvalidResponse(format!("Bad technician list: {}", e)))?;

        Ok(Page {
            items: parsed.get_technician_list.user_list,
            has_more: parsed.get_technician_list.list_info.has_more,
        })
    }

    async fn conversation_events(&self, ticket_id: &str) -> Result<Vec<ConversationEvent>> {
        #[derive(Debug, Default, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        struct ConversationList {
            conversations: Vec<ConversationEvent>,
        }

        #[derive(Debug, Default, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        struct ConversationListData {
            get_conversation_list: ConversationList,
        }

        let query = "query getConversationList($input: ConversationListInput!) {
            getConversationList(input: $input) {
                conversations { type }
            }
        }";

        let variables = json!({
            "input": {
                "ticketId": ticket_id,
            }
        });

        let data = self.post_graphql(query, variables).await?;
        let parsed: ConversationListData = serde_json::from_value(data)
            .map_err(|e| ApiError::InvalidResponse(format!("Bad conversation list: {}", e)))?;

        Ok(parsed.get_conversation_list.conversations)
    }
}
