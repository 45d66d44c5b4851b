use chronolog_domain::{
    parse_datetime, MessageRepository, NewMessage, TenantNamespace, TenantProvisioner, TenantStats,
};
use chronolog_postgres::{
    PostgresClient, PostgresConfig, PostgresMessageRepository, PostgresTenantProvisioner,
};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;

async fn start_postgres() -> (ContainerAsync<Postgres>, PostgresClient) {
    let postgres = Postgres::default().start().await.unwrap();
    let host = postgres.get_host().await.unwrap();
    let port = postgres.get_host_port_ipv4(5432).await.unwrap();

    let config = PostgresConfig {
        host: host.to_string(),
        port,
        database: "postgres".to_string(),
        username: "postgres".to_string(),
        password: "postgres".to_string(),
        max_pool_size: 5,
        statement_timeout_ms: 10_000,
    };
    let client = PostgresClient::new(&config).unwrap();
    client.ping().await.unwrap();

    (postgres, client)
}

fn new_message(datetime: &str, environment: &str) -> NewMessage {
    NewMessage {
        datetime: parse_datetime(datetime).unwrap(),
        environment: environment.to_string(),
    }
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn provision_is_idempotent_and_inserts_round_trip() {
    let (_container, client) = start_postgres().await;
    let provisioner = PostgresTenantProvisioner::new(client.clone());
    let repository = PostgresMessageRepository::new(client);

    let namespace = TenantNamespace::derive("acme-1").unwrap();
    provisioner.ensure_tenant_storage(&namespace).await.unwrap();
    // Second call must be a no-op
    provisioner.ensure_tenant_storage(&namespace).await.unwrap();

    let first = repository
        .insert_message(&namespace, new_message("2024-01-01T00:00:00Z", "prod"))
        .await
        .unwrap();
    let second = repository
        .insert_message(&namespace, new_message("2024-01-02T00:00:00Z", "prod"))
        .await
        .unwrap();

    assert_eq!(first.environment, "prod");
    assert!(second.id > first.id);
    assert_eq!(
        first.datetime,
        parse_datetime("2024-01-01T00:00:00Z").unwrap()
    );

    let records = repository
        .query_messages(&namespace, "prod", 10)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    // Newest first
    assert_eq!(records[0].id, second.id);
    assert_eq!(records[1].id, first.id);
    assert!(records[0].created_at >= records[1].created_at);
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn query_on_unknown_tenant_returns_empty() {
    let (_container, client) = start_postgres().await;
    let repository = PostgresMessageRepository::new(client);

    let namespace = TenantNamespace::derive("never-provisioned").unwrap();
    let records = repository
        .query_messages(&namespace, "prod", 100)
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn aggregate_on_unknown_tenant_returns_zero_stats() {
    let (_container, client) = start_postgres().await;
    let repository = PostgresMessageRepository::new(client);

    let namespace = TenantNamespace::derive("never-provisioned").unwrap();
    let stats = repository.aggregate_stats(&namespace).await.unwrap();
    assert_eq!(stats, TenantStats::empty());
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn aggregate_counts_by_environment() {
    let (_container, client) = start_postgres().await;
    let provisioner = PostgresTenantProvisioner::new(client.clone());
    let repository = PostgresMessageRepository::new(client);

    let namespace = TenantNamespace::derive("acme-1").unwrap();
    provisioner.ensure_tenant_storage(&namespace).await.unwrap();

    let record = repository
        .insert_message(&namespace, new_message("2024-01-01T00:00:00Z", "test"))
        .await
        .unwrap();

    let stats = repository.aggregate_stats(&namespace).await.unwrap();
    assert_eq!(stats.total_messages, 1);
    assert_eq!(stats.prod_messages, 0);
    assert_eq!(stats.test_messages, 1);
    assert_eq!(stats.last_message, Some(record.created_at));
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn tenants_are_isolated() {
    let (_container, client) = start_postgres().await;
    let provisioner = PostgresTenantProvisioner::new(client.clone());
    let repository = PostgresMessageRepository::new(client);

    let acme = TenantNamespace::derive("acme-1").unwrap();
    let globex = TenantNamespace::derive("globex").unwrap();
    provisioner.ensure_tenant_storage(&acme).await.unwrap();
    provisioner.ensure_tenant_storage(&globex).await.unwrap();

    repository
        .insert_message(&acme, new_message("2024-01-01T00:00:00Z", "prod"))
        .await
        .unwrap();

    let acme_records = repository.query_messages(&acme, "prod", 10).await.unwrap();
    let globex_records = repository
        .query_messages(&globex, "prod", 10)
        .await
        .unwrap();
    assert_eq!(acme_records.len(), 1);
    assert!(globex_records.is_empty());

    let globex_stats = repository.aggregate_stats(&globex).await.unwrap();
    assert_eq!(globex_stats.total_messages, 0);
}
