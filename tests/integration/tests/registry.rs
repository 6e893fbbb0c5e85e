//! Shared clients per configuration.

use std::sync::Arc;

use ldapi_client::{ClientRegistry, DirectoryConfig};
use tokio::task::JoinSet;

use crate::common::TestEnv;

#[tokio::test]
#[ignore = "Requires Docker"]
async fn same_config_shares_one_client() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let registry = Arc::new(ClientRegistry::new());

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        let config = env.config.clone();
        tasks.spawn(async move { registry.get_or_connect(&config).await });
    }

    let mut clients = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        clients.push(joined??);
    }
    assert_eq!(registry.len(), 1);
    assert!(clients.iter().all(|c| Arc::ptr_eq(c, &clients[0])));

    let other = DirectoryConfig {
        login_attribute: "mail".to_string(),
        ..env.config.clone()
    };
    let second = registry.get_or_connect(&other).await?;
    assert!(!Arc::ptr_eq(&second, &clients[0]));
    assert_eq!(registry.len(), 2);

    assert!(registry.remove(&env.config).await?);
    assert!(!clients[0].is_open().await);
    assert!(registry.get(&env.config).is_none());
    assert_eq!(registry.len(), 1);

    registry.close_all().await;
    assert!(registry.is_empty());
    Ok(())
}
