//! Access applications, including SCIM provisioning settings

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::api::client::Client;
use crate::api::container::ResourceContainer;
use crate::api::error::{Error, Result};
use crate::api::pagination::{Paginated, PaginationOptions};
use crate::api::polymorphic::{decode_variant, split_discriminator, unknown_variant};
use crate::api::query::{Query, QueryParams};
use crate::api::response::{null_default, ResultInfo};
use crate::resources::require;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScimHttpBasic {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScimOauthBearerToken {
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScimOauth2 {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_url: String,
    pub token_url: String,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

/// How Access authenticates against the remote SCIM service.
///
/// On the wire the variant is selected by `scheme`: `httpbasic`,
/// `oauthbearertoken` or `oauth2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum ScimAuthentication {
    HttpBasic(ScimHttpBasic),
    OauthBearerToken(ScimOauthBearerToken),
    Oauth2(ScimOauth2),
}

impl ScimAuthentication {
    pub fn scheme(&self) -> &'static str {
        match self {
            ScimAuthentication::HttpBasic(_) => "httpbasic",
            ScimAuthentication::OauthBearerToken(_) => "oauthbearertoken",
            ScimAuthentication::Oauth2(_) => "oauth2",
        }
    }
}

impl<'de> Deserialize<'de> for ScimAuthentication {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let (scheme, map) = split_discriminator::<D::Error>(value, "scheme")?;

        match scheme.as_str() {
            "httpbasic" => decode_variant(map).map(ScimAuthentication::HttpBasic),
            "oauthbearertoken" => decode_variant(map).map(ScimAuthentication::OauthBearerToken),
            "oauth2" => decode_variant(map).map(ScimAuthentication::Oauth2),
            other => Err(unknown_variant("scheme", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScimMappingOperations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScimMapping {
    pub schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub filter: String,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub transform_jsonata: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<ScimMappingOperations>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScimConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    pub remote_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<ScimAuthentication>,
    pub idp_uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deactivate_on_delete: Option<bool>,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<ScimMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessApplication {
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(
        default,
        deserialize_with = "null_default",
        rename = "type",
        skip_serializing_if = "String::is_empty"
    )]
    pub app_type: String,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_duration: Option<String>,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Vec::is_empty")]
    pub allowed_idps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_redirect_to_identity: Option<bool>,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Vec::is_empty")]
    pub self_hosted_domains: Vec<String>,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scim_config: Option<ScimConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ListAccessApplicationsParams {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub aud: Option<String>,
    pub search: Option<String>,
    pub pagination: PaginationOptions,
}

impl QueryParams for ListAccessApplicationsParams {
    fn append_query(&self, query: &mut Query) {
        query
            .opt("name", self.name.as_ref())
            .opt("domain", self.domain.as_ref())
            .opt("aud", self.aud.as_ref())
            .opt("search", self.search.as_ref())
            .extend(&self.pagination);
    }
}

impl Paginated for ListAccessApplicationsParams {
    fn pagination_mut(&mut self) -> &mut PaginationOptions {
        &mut self.pagination
    }
}

fn apps_path(rc: &ResourceContainer) -> String {
    format!("{}/access/apps", rc.path())
}

impl Client {
    /// The returned [`ResultInfo`] points one page past the last page served.
    pub async fn list_access_applications(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        params: ListAccessApplicationsParams,
    ) -> Result<(Vec<AccessApplication>, ResultInfo)> {
        rc.validate()?;
        self.list_pages(ctx, &apps_path(rc), params, 25).await
    }

    pub async fn get_access_application(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        application_id: &str,
    ) -> Result<AccessApplication> {
        rc.validate()?;
        require(application_id, Error::MissingResourceId("application id"))?;
        self.get(ctx, format!("{}/{}", apps_path(rc), application_id))
            .await
    }

    pub async fn create_access_application(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        application: &AccessApplication,
    ) -> Result<AccessApplication> {
        rc.validate()?;
        self.post(ctx, apps_path(rc), application).await
    }

    /// Update the application identified by `application.id`.
    pub async fn update_access_application(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        application: &AccessApplication,
    ) -> Result<AccessApplication> {
        rc.validate()?;
        require(&application.id, Error::MissingResourceId("application id"))?;
        self.put(
            ctx,
            format!("{}/{}", apps_path(rc), application.id),
            application,
        )
        .await
    }

    pub async fn delete_access_application(
        &self,
        ctx: &CancellationToken,
        rc: &ResourceContainer,
        application_id: &str,
    ) -> Result<()> {
        rc.validate()?;
        require(application_id, Error::MissingResourceId("application id"))?;
        let _: IgnoredAny = self
            .delete(ctx, format!("{}/{}", apps_path(rc), application_id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn oauth2() -> ScimAuthentication {
        ScimAuthentication::Oauth2(ScimOauth2 {
            client_id: "beepboop".into(),
            client_secret: "bop".into(),
            authorization_url: "https://www.authorization.com".into(),
            token_url: "https://www.token.com".into(),
            scopes: vec!["read".into()],
        })
    }

    #[test]
    fn decodes_each_scheme() {
        let basic: ScimAuthentication =
            serde_json::from_value(json!({"scheme": "httpbasic", "user": "u", "password": "p"}))
                .unwrap();
        assert_eq!(
            basic,
            ScimAuthentication::HttpBasic(ScimHttpBasic {
                user: "u".into(),
                password: "p".into()
            })
        );

        let bearer: ScimAuthentication =
            serde_json::from_value(json!({"scheme": "oauthbearertoken", "token": "t"})).unwrap();
        assert_eq!(bearer.scheme(), "oauthbearertoken");

        let decoded: ScimAuthentication = serde_json::from_value(json!({
            "scheme": "oauth2",
            "client_id": "beepboop",
            "client_secret": "bop",
            "authorization_url": "https://www.authorization.com",
            "token_url": "https://www.token.com",
            "scopes": ["read"]
        }))
        .unwrap();
        assert_eq!(decoded, oauth2());
    }

    #[test]
    fn encodes_scheme_alongside_fields() {
        let value = serde_json::to_value(ScimAuthentication::OauthBearerToken(
            ScimOauthBearerToken { token: "t".into() },
        ))
        .unwrap();
        assert_eq!(value, json!({"scheme": "oauthbearertoken", "token": "t"}));
    }

    #[test]
    fn round_trips_every_variant() {
        for auth in [
            ScimAuthentication::HttpBasic(ScimHttpBasic {
                user: "u".into(),
                password: "p".into(),
            }),
            ScimAuthentication::OauthBearerToken(ScimOauthBearerToken { token: "t".into() }),
            oauth2(),
        ] {
            let encoded = serde_json::to_string(&auth).unwrap();
            let decoded: ScimAuthentication = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, auth);
        }
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let err = serde_json::from_value::<ScimAuthentication>(json!({"scheme": "kerberos"}))
            .unwrap_err();
        assert!(err.to_string().contains("invalid scheme"));

        let err = serde_json::from_value::<ScimAuthentication>(json!({"token": "t"})).unwrap_err();
        assert!(err.to_string().contains("invalid scheme"));
    }

    #[test]
    fn decodes_application_with_scim_config() {
        let app: AccessApplication = serde_json::from_value(json!({
            "id": "480f4f69-1a28-4fdd-9240-1ed29f0ac1db",
            "name": "Admin Site",
            "domain": "test.example.com/admin",
            "type": "self_hosted",
            "aud": "737646a56ab1df6ec9bddc7e5ca84eaf3b0768850f3ffb5d74f1534911fe3893",
            "session_duration": "24h",
            "scim_config": {
                "enabled": true,
                "remote_uri": "https://scim.example.com",
                "idp_uid": "41ecfbb341f033e52b46742756aabb8b",
                "authentication": {"scheme": "httpbasic", "user": "admin", "password": "secret"},
                "deactivate_on_delete": true
            },
            "created_at": "2014-01-01T05:20:00.12345Z"
        }))
        .unwrap();

        assert_eq!(app.app_type, "self_hosted");
        let scim = app.scim_config.unwrap();
        assert_eq!(scim.authentication.unwrap().scheme(), "httpbasic");
        assert_eq!(scim.deactivate_on_delete, Some(true));
    }
}
