//! Common test utilities and fixtures.

use std::time::Duration;

use ldapi_client::{Attributes, DirectoryClient, DirectoryConfig};
use testcontainers::{
    core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, GenericImage, ImageExt,
};
use tokio::time::sleep;

pub const BASE_DN: &str = "dc=example,dc=org";
pub const ADMIN_DN: &str = "cn=admin,dc=example,dc=org";
pub const ADMIN_PASSWORD: &str = "admin";
pub const PEOPLE_DN: &str = "ou=people,dc=example,dc=org";

/// An OpenLDAP container and a bound admin client.
pub struct TestEnv {
    /// Directory server container.
    _ldap: ContainerAsync<GenericImage>,
    /// Admin configuration.
    pub config: DirectoryConfig,
    /// Client bound as the admin.
    pub client: DirectoryClient,
}

impl TestEnv {
    /// Starts a fresh directory server with `ou=people` created.
    pub async fn new() -> anyhow::Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("ldapi_client=debug")
            .try_init();

        let ldap = GenericImage::new("osixia/openldap", "1.5.0")
            .with_exposed_port(389.tcp())
            .with_env_var("LDAP_ORGANISATION", "Example")
            .with_env_var("LDAP_DOMAIN", "example.org")
            .with_env_var("LDAP_ADMIN_PASSWORD", ADMIN_PASSWORD)
            .start()
            .await?;

        let port = ldap.get_host_port_ipv4(389.tcp()).await?;
        let config = DirectoryConfig::builder()
            .host(format!("ldap://127.0.0.1:{port}"))
            .base_dn(BASE_DN)
            .bind_dn(ADMIN_DN)
            .bind_password(ADMIN_PASSWORD)
            .objectclass_person(vec!["inetOrgPerson".to_string()])
            .build()?;

        let client = wait_for_server(&config).await?;

        client
            .add(
                PEOPLE_DN,
                &attrs(&[
                    ("objectClass", "organizationalUnit"),
                    ("objectClass", "top"),
                    ("ou", "people"),
                ]),
            )
            .await?;

        Ok(Self {
            _ldap: ldap,
            config,
            client,
        })
    }

    /// Adds a person under `ou=people` and returns its DN.
    pub async fn add_person(&self, uid: &str, cn: &str) -> anyhow::Result<String> {
        let dn = format!("uid={uid},{PEOPLE_DN}");
        self.client
            .add(
                &dn,
                &attrs(&[
                    ("objectClass", "inetOrgPerson"),
                    ("objectClass", "top"),
                    ("uid", uid),
                    ("cn", cn),
                    ("sn", cn),
                ]),
            )
            .await?;
        Ok(dn)
    }
}

/// Builds attributes from `(name, value)` pairs; repeated names collect values.
pub fn attrs(pairs: &[(&str, &str)]) -> Attributes {
    let mut attributes = Attributes::new();
    for (name, value) in pairs {
        attributes
            .entry((*name).to_string())
            .or_default()
            .push((*value).to_string());
    }
    attributes
}

/// Retries connect and bind until the server accepts them.
async fn wait_for_server(config: &DirectoryConfig) -> anyhow::Result<DirectoryClient> {
    let mut last_error = None;
    for _ in 0..60 {
        match DirectoryClient::connect(config.clone()).await {
            Ok(client) => return Ok(client),
            Err(e) => last_error = Some(e),
        }
        sleep(Duration::from_millis(500)).await;
    }
    Err(anyhow::anyhow!(
        "directory server did not become ready: {last_error:?}"
    ))
}
