//! Smoke test: connect to Neo4j via bolt:// and run the connectivity probe.
//! Run with: cargo test -p tiltakskort-graph --test cloud_connect -- --ignored

use tiltakskort_graph::{query, GraphClient};

#[tokio::test]
#[ignore] // requires live Neo4j credentials
async fn cloud_connect() {
    let uri = std::env::var("NEO4J_URI").expect("NEO4J_URI required");
    let user = std::env::var("NEO4J_USER").expect("NEO4J_USER required");
    let password = std::env::var("NEO4J_PASSWORD").expect("NEO4J_PASSWORD required");
    let database = std::env::var("NEO4J_DATABASE").unwrap_or_else(|_| "neo4j".to_string());

    let client = GraphClient::connect_to(&uri, &user, &password, &database)
        .await
        .expect("Failed to connect");

    client
        .verify_connectivity()
        .await
        .expect("Connectivity probe failed");

    let mut result = client
        .inner()
        .execute(query("MATCH (k:Kategori) RETURN count(k) AS n"))
        .await
        .unwrap();
    let row = result.next().await.unwrap().expect("No result row");
    let n: i64 = row.get("n").unwrap();
    assert!(n >= 0);
}
