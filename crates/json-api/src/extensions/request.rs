//! Request helper extensions.

use salvo::{http::header::USER_AGENT, prelude::Request};

use townhall_app::{auth::AdminRecord, domain::audit::data::Actor};

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

pub(crate) trait RequestExt {
    /// Who is acting, and from where, for the audit log.
    fn actor(&self, admin: &AdminRecord) -> Actor;

    /// First `X-Forwarded-For` hop, else the peer address.
    fn client_ip(&self) -> Option<String>;

    fn user_agent(&self) -> Option<String>;
}

impl RequestExt for Request {
    fn actor(&self, admin: &AdminRecord) -> Actor {
        Actor {
            admin_uuid: admin.uuid,
            email: admin.email.clone(),
            ip: self.client_ip(),
            user_agent: self.user_agent(),
        }
    }

    fn client_ip(&self) -> Option<String> {
        let forwarded = self
            .header::<String>(FORWARDED_FOR_HEADER)
            .and_then(|value| value.split(',').next().map(|ip| ip.trim().to_string()))
            .filter(|ip| !ip.is_empty());

        forwarded.or_else(|| Some(self.remote_addr().to_string()))
    }

    fn user_agent(&self) -> Option<String> {
        self.header::<String>(USER_AGENT)
    }
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;

    use super::*;

    #[test]
    fn first_forwarded_hop_is_the_client() {
        let req: Request = TestClient::get("http://example.com")
            .add_header(FORWARDED_FOR_HEADER, "203.0.113.7, 10.0.0.1", true)
            .add_header(USER_AGENT, "curl/8.5", true)
            .build();

        assert_eq!(req.client_ip().as_deref(), Some("203.0.113.7"));
        assert_eq!(req.user_agent().as_deref(), Some("curl/8.5"));
    }
}
