//! Bind, search and write operations.

use ldapi_client::{DirectoryClient, DirectoryConfig, DirectoryError, ModifyKind};
use ldapi_crypto::{verify_password, PasswordScheme};

use crate::common::{attrs, TestEnv, ADMIN_DN, BASE_DN, PEOPLE_DN};

#[tokio::test]
#[ignore = "Requires Docker"]
async fn search_finds_base_entry() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let entries = env
        .client
        .search("(objectClass=organizationalUnit)", None, &["ou"])
        .await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].dn, PEOPLE_DN);
    assert_eq!(entries[0].get_attr("ou"), Some("people"));

    let none = env.client.search("(uid=nobody)", None, &[]).await?;
    assert!(none.is_empty());
    Ok(())
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn search_under_missing_base_is_no_such_object() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let err = env
        .client
        .search("(objectClass=*)", Some("ou=missing,dc=example,dc=org"), &[])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn wrong_bind_password_is_invalid_credentials() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let config = DirectoryConfig {
        bind_password: "wrong".to_string(),
        ..env.config.clone()
    };
    let err = DirectoryClient::connect(config).await.unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidCredentials(dn) if dn == ADMIN_DN));
    Ok(())
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn entry_lifecycle() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let dn = env.add_person("jdoe", "John Doe").await?;

    let err = env.add_person("jdoe", "John Doe").await.unwrap_err();
    let err = err.downcast::<DirectoryError>()?;
    assert!(matches!(err, DirectoryError::AlreadyExists(_)));

    env.client
        .modify(&dn, &attrs(&[("mail", "jdoe@example.org")]))
        .await?;
    env.client
        .modify_with(&dn, &attrs(&[("mail", "john@example.org")]), ModifyKind::Add)
        .await?;

    let entry = env.client.find_user("jdoe").await?.expect("user exists");
    let mut mail = entry.get_attrs("mail").cloned().unwrap_or_default();
    mail.sort();
    assert_eq!(mail, ["jdoe@example.org", "john@example.org"]);
    assert_eq!(entry.display_name(&env.config), Some("John Doe"));

    env.client
        .modify_with(&dn, &attrs(&[("mail", "jdoe@example.org")]), ModifyKind::Delete)
        .await?;
    let entry = env.client.first_entry("(uid=jdoe)").await?.expect("user exists");
    assert_eq!(entry.get_attrs("mail").map(Vec::len), Some(1));

    assert_eq!(
        env.client.get_dn("(uid=jdoe)").await?.as_deref(),
        Some(dn.as_str())
    );
    assert_eq!(DirectoryClient::ou_rdn(&dn)?.as_deref(), Some("people"));

    env.client.delete(&dn).await?;
    assert!(env.client.get_dn("(uid=jdoe)").await?.is_none());

    let err = env.client.delete(&dn).await.unwrap_err();
    assert!(matches!(err, DirectoryError::NoSuchObject(_)));
    Ok(())
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn set_password_and_authenticate() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let dn = env.add_person("asmith", "Alice Smith").await?;

    env.client
        .set_password(&dn, "s3cret", PasswordScheme::Ssha)
        .await?;

    let entry = env
        .client
        .search("(uid=asmith)", Some(BASE_DN), &["userPassword"])
        .await?
        .pop()
        .expect("user exists");
    let stored = entry
        .get_attr("userPassword")
        .map(ToString::to_string)
        .or_else(|| {
            entry
                .get_binary_attr("userPassword")
                .map(|b| String::from_utf8_lossy(b).into_owned())
        })
        .expect("password stored");
    assert!(stored.starts_with("{SSHA}"));
    assert!(verify_password("s3cret", &stored)?);

    assert!(env.client.authenticate("asmith", "s3cret").await?);
    assert!(!env.client.authenticate("asmith", "wrong").await?);
    assert!(!env.client.authenticate("asmith", "").await?);
    assert!(!env.client.authenticate("nobody", "s3cret").await?);

    // The admin binding is untouched by the user binds above.
    env.client
        .modify(&dn, &attrs(&[("description", "still admin")]))
        .await?;
    Ok(())
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn closed_client_rejects_operations() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    env.client.close().await?;
    assert!(!env.client.is_open().await);

    let err = env.client.search("(objectClass=*)", None, &[]).await.unwrap_err();
    assert!(matches!(err, DirectoryError::Closed));

    env.client.close().await?;
    Ok(())
}
