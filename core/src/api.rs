//! The endpoint descriptor table and the per-operation wrapper methods.
//!
//! # Design
//! Each API operation is one [`Endpoint`] constant plus a one-line wrapper on
//! [`Session`] that forwards to the generic bind-and-call path. Adding an
//! operation means adding a descriptor and a wrapper — no request-building
//! code. This is a representative subset of the Traffic Ops surface; the
//! full API is hundreds of operations that all bind the same way.

use serde_json::Value;

use crate::endpoint::{ApiVersion, Endpoint, PathArgs};
use crate::http::HttpMethod;
use crate::session::{ApiResult, Session};
use crate::Error;
use crate::HttpResponse;

const V1_1_UP: &[ApiVersion] = &[ApiVersion::V1_1, ApiVersion::V1_2, ApiVersion::V1_3];
const V1_2_UP: &[ApiVersion] = &[ApiVersion::V1_2, ApiVersion::V1_3];

/// Page size used by the fetch-all composite operations.
const FETCH_ALL_LIMIT: u64 = 10_000;

pub const USER_LOGIN: Endpoint = Endpoint {
    method: HttpMethod::Post,
    template: "user/login",
    versions: V1_1_UP,
};

pub const GET_API_CAPABILITIES: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "api_capabilities",
    versions: V1_2_UP,
};

pub const GET_ASNS: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "asns",
    versions: V1_1_UP,
};

pub const GET_CACHE_STATS: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "caches/stats",
    versions: V1_1_UP,
};

pub const GET_CDNS: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "cdns",
    versions: V1_1_UP,
};

pub const GET_CDN_BY_ID: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "cdns/{cdn_id:d}",
    versions: V1_1_UP,
};

pub const GET_CDN_BY_NAME: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "cdns/name/{cdn_name}",
    versions: V1_1_UP,
};

pub const CREATE_CDN: Endpoint = Endpoint {
    method: HttpMethod::Post,
    template: "cdns",
    versions: V1_1_UP,
};

pub const UPDATE_CDN_BY_ID: Endpoint = Endpoint {
    method: HttpMethod::Put,
    template: "cdns/{cdn_id:d}",
    versions: V1_1_UP,
};

pub const DELETE_CDN_BY_ID: Endpoint = Endpoint {
    method: HttpMethod::Delete,
    template: "cdns/{cdn_id:d}",
    versions: V1_1_UP,
};

pub const CDNS_QUEUE_UPDATE: Endpoint = Endpoint {
    method: HttpMethod::Post,
    template: "cdns/{cdn_id:d}/queue_update",
    versions: V1_1_UP,
};

pub const GET_DELIVERYSERVICES: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "deliveryservices",
    versions: V1_1_UP,
};

pub const GET_DELIVERYSERVICE_BY_ID: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "deliveryservices/{delivery_service_id:d}",
    versions: V1_1_UP,
};

pub const GET_DELIVERYSERVICE_SSL_KEYS_BY_XML_ID: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "deliveryservices/xmlId/{xml_id}/sslkeys",
    versions: V1_1_UP,
};

pub const GET_DELIVERYSERVICE_SERVER: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "deliveryserviceserver",
    versions: V1_1_UP,
};

pub const ASSIGN_DELIVERYSERVICE_SERVERS: Endpoint = Endpoint {
    method: HttpMethod::Post,
    template: "deliveryserviceserver",
    versions: V1_1_UP,
};

pub const GET_REGIONS: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "regions",
    versions: V1_1_UP,
};

pub const GET_SERVERS: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "servers",
    versions: V1_1_UP,
};

pub const GET_SERVER_BY_ID: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "servers/{server_id:d}",
    versions: V1_1_UP,
};

pub const GET_TYPES: Endpoint = Endpoint {
    method: HttpMethod::Get,
    template: "types",
    versions: V1_1_UP,
};

impl Session {
    pub fn get_api_capabilities(&self, query: &[(String, String)]) -> ApiResult {
        self.request(&GET_API_CAPABILITIES, &PathArgs::new(), query, None)
    }

    pub fn get_asns(&self, query: &[(String, String)]) -> ApiResult {
        self.request(&GET_ASNS, &PathArgs::new(), query, None)
    }

    pub fn get_cache_stats(&self) -> ApiResult {
        self.request(&GET_CACHE_STATS, &PathArgs::new(), &[], None)
    }

    pub fn get_cdns(&self) -> ApiResult {
        self.request(&GET_CDNS, &PathArgs::new(), &[], None)
    }

    pub fn get_cdn_by_id(&self, cdn_id: i64) -> ApiResult {
        self.request(
            &GET_CDN_BY_ID,
            &PathArgs::new().set("cdn_id", cdn_id),
            &[],
            None,
        )
    }

    pub fn get_cdn_by_name(&self, cdn_name: &str) -> ApiResult {
        self.request(
            &GET_CDN_BY_NAME,
            &PathArgs::new().set("cdn_name", cdn_name),
            &[],
            None,
        )
    }

    pub fn create_cdn(&self, data: Value) -> ApiResult {
        self.request(&CREATE_CDN, &PathArgs::new(), &[], Some(data))
    }

    pub fn update_cdn_by_id(&self, cdn_id: i64, data: Value) -> ApiResult {
        self.request(
            &UPDATE_CDN_BY_ID,
            &PathArgs::new().set("cdn_id", cdn_id),
            &[],
            Some(data),
        )
    }

    pub fn delete_cdn_by_id(&self, cdn_id: i64) -> ApiResult {
        self.request(
            &DELETE_CDN_BY_ID,
            &PathArgs::new().set("cdn_id", cdn_id),
            &[],
            None,
        )
    }

    pub fn cdns_queue_update(&self, cdn_id: i64, data: Value) -> ApiResult {
        self.request(
            &CDNS_QUEUE_UPDATE,
            &PathArgs::new().set("cdn_id", cdn_id),
            &[],
            Some(data),
        )
    }

    pub fn get_deliveryservices(&self, query: &[(String, String)]) -> ApiResult {
        self.request(&GET_DELIVERYSERVICES, &PathArgs::new(), query, None)
    }

    pub fn get_deliveryservice_by_id(&self, delivery_service_id: i64) -> ApiResult {
        self.request(
            &GET_DELIVERYSERVICE_BY_ID,
            &PathArgs::new().set("delivery_service_id", delivery_service_id),
            &[],
            None,
        )
    }

    pub fn get_deliveryservice_ssl_keys_by_xml_id(
        &self,
        xml_id: &str,
        query: &[(String, String)],
    ) -> ApiResult {
        self.request(
            &GET_DELIVERYSERVICE_SSL_KEYS_BY_XML_ID,
            &PathArgs::new().set("xml_id", xml_id),
            query,
            None,
        )
    }

    /// One page of delivery service / server assignments.
    pub fn get_deliveryservice_server(&self, query: &[(String, String)]) -> ApiResult {
        self.request(&GET_DELIVERYSERVICE_SERVER, &PathArgs::new(), query, None)
    }

    pub fn assign_deliveryservice_servers(&self, data: Value) -> ApiResult {
        self.request(&ASSIGN_DELIVERYSERVICE_SERVERS, &PathArgs::new(), &[], Some(data))
    }

    /// Every delivery service / server assignment, across all pages.
    ///
    /// Composite over [`Session::get_all_pages`]; see its documentation for
    /// the termination contract and the last-response-only return.
    pub fn get_all_deliveryservice_servers(
        &self,
    ) -> Result<(Vec<Value>, HttpResponse), Error> {
        self.get_all_pages(
            &GET_DELIVERYSERVICE_SERVER,
            &PathArgs::new(),
            &[],
            FETCH_ALL_LIMIT,
        )
    }

    pub fn get_regions(&self, query: &[(String, String)]) -> ApiResult {
        self.request(&GET_REGIONS, &PathArgs::new(), query, None)
    }

    pub fn get_servers(&self, query: &[(String, String)]) -> ApiResult {
        self.request(&GET_SERVERS, &PathArgs::new(), query, None)
    }

    pub fn get_server_by_id(&self, server_id: i64) -> ApiResult {
        self.request(
            &GET_SERVER_BY_ID,
            &PathArgs::new().set("server_id", server_id),
            &[],
            None,
        )
    }

    pub fn get_types(&self, query: &[(String, String)]) -> ApiResult {
        self.request(&GET_TYPES, &PathArgs::new(), query, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_placeholders_match_wrapper_arguments() {
        // Spot-check that the templates with typed placeholders resolve with
        // the arguments their wrappers supply.
        let path = GET_CDN_BY_ID
            .resolve_path(&PathArgs::new().set("cdn_id", 4))
            .unwrap();
        assert_eq!(path, "cdns/4");

        let path = GET_DELIVERYSERVICE_SSL_KEYS_BY_XML_ID
            .resolve_path(&PathArgs::new().set("xml_id", "my-ds"))
            .unwrap();
        assert_eq!(path, "deliveryservices/xmlId/my-ds/sslkeys");
    }

    #[test]
    fn login_is_available_in_every_version() {
        for version in [ApiVersion::V1_1, ApiVersion::V1_2, ApiVersion::V1_3] {
            assert!(USER_LOGIN.versions.contains(&version));
        }
    }

    #[test]
    fn capability_listing_starts_at_1_2() {
        assert!(!GET_API_CAPABILITIES.versions.contains(&ApiVersion::V1_1));
        assert!(GET_API_CAPABILITIES.versions.contains(&ApiVersion::V1_2));
    }

    #[test]
    fn cdn_by_id_is_available_in_every_version() {
        for version in [ApiVersion::V1_1, ApiVersion::V1_2, ApiVersion::V1_3] {
            assert!(GET_CDN_BY_ID.versions.contains(&version));
        }
    }
}
