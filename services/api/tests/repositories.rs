//! Repository behaviour against a live database

use api::{
    models::{
        chat::NewChatGroup,
        missing::MissingFilter,
        pet::PetPayload,
        product::{NewProduct, ProductDetail},
        user::Role,
    },
    repositories::{
        ChatRepository, MissingRepository, PetRepository, ProductRepository,
        chat::SendOutcome,
    },
    session::Session,
};
use common::database::{DatabaseConfig, init_pool, run_migrations};
use futures::future::join_all;
use sqlx::PgPool;
use uuid::Uuid;

async fn pool() -> PgPool {
    let pool = init_pool(&DatabaseConfig::from_env().unwrap()).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

fn pet(name: &str) -> PetPayload {
    PetPayload {
        name: name.to_string(),
        description: "Vira-lata caramelo".to_string(),
        contact: "(11) 98765-4321".to_string(),
        image_base64: None,
    }
}

fn session(name: &str) -> Session {
    Session {
        user_id: Uuid::new_v4(),
        email: format!("{}@example.com", name.to_lowercase()),
        display_name: name.to_string(),
        role: Role::User,
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_pet_list_is_scoped_to_owner() {
    let pets = PetRepository::new(pool().await);
    let ana = Uuid::new_v4();
    let bia = Uuid::new_v4();

    pets.create(ana, &pet("Rex")).await.unwrap();
    pets.create(ana, &pet("Luna")).await.unwrap();
    pets.create(bia, &pet("Thor")).await.unwrap();

    let listed = pets.list_by_owner(ana).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|p| p.owner_id == ana));
    // Newest first
    assert_eq!(listed[0].name, "Luna");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_product_toggle_twice_restores_state() {
    let products = ProductRepository::new(pool().await);
    let product = products
        .create(
            Uuid::new_v4(),
            &NewProduct {
                name: "Ração Premium".to_string(),
                description: "15kg".to_string(),
                price: "49.90".to_string(),
                contact: "11987654321".to_string(),
                image_base64: None,
                stock: Some(0),
                category: "Ração".to_string(),
            }
            .validate()
            .unwrap(),
        )
        .await
        .unwrap();

    let once = products.toggle_active(product.id).await.unwrap().unwrap();
    let twice = products.toggle_active(product.id).await.unwrap().unwrap();
    assert_eq!(once.active, !product.active);
    assert_eq!(twice.active, product.active);

    let detail = ProductDetail::new(twice, Some(1));
    assert!(detail.sold_out);
    assert!(!detail.purchasable);
    assert!(detail.total.is_none());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_found_is_sticky_until_admin_toggle() {
    let missing = MissingRepository::new(pool().await);
    let report = missing.create(Uuid::new_v4(), &pet("Mel")).await.unwrap();
    assert!(!report.found);

    let found = missing.mark_found(report.id).await.unwrap().unwrap();
    assert!(found.found);
    let again = missing.mark_found(report.id).await.unwrap().unwrap();
    assert!(again.found);

    let listed = missing.list(MissingFilter::Found).await.unwrap();
    assert!(listed.iter().any(|r| r.id == report.id));

    let reverted = missing.toggle_found(report.id).await.unwrap().unwrap();
    assert!(!reverted.found);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_send_appends_and_updates_summary() {
    let chat = ChatRepository::new(pool().await);
    let creator = session("Ana");
    let sender = session("Bia");

    let group = chat
        .create_group(
            &creator,
            &NewChatGroup {
                name: "Cães do bairro".to_string(),
                description: "Passeios".to_string(),
                category: None,
                icon: None,
            }
            .validate()
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(group.member_count, 1);

    let message = match chat.send_message(group.id, &sender, "oi").await.unwrap() {
        SendOutcome::Sent(message) => message,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(message.sender_id, sender.user_id);

    let messages = chat.list_messages(group.id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "oi");

    let group = chat.find_group(group.id).await.unwrap().unwrap();
    assert_eq!(group.last_message, "oi");
    assert!(group.is_member(sender.user_id));
    assert_eq!(group.member_count, 2);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_concurrent_sends_and_joins() {
    let chat = ChatRepository::new(pool().await);
    let creator = session("Ana");
    let group = chat
        .create_group(
            &creator,
            &NewChatGroup {
                name: "Gatos".to_string(),
                description: "Tudo sobre gatos".to_string(),
                category: Some("Gatos".to_string()),
                icon: None,
            }
            .validate()
            .unwrap(),
        )
        .await
        .unwrap();

    let senders: Vec<Session> = (0..8).map(|i| session(&format!("User{}", i))).collect();
    let outcomes = join_all(
        senders
            .iter()
            .map(|s| chat.send_message(group.id, s, "miau")),
    )
    .await;
    assert!(
        outcomes
            .into_iter()
            .all(|o| matches!(o, Ok(SendOutcome::Sent(_))))
    );

    let joins = join_all((0..4).map(|_| chat.join(group.id, creator.user_id))).await;
    assert!(joins.into_iter().all(|j| matches!(j, Ok(false))));

    let group = chat.find_group(group.id).await.unwrap().unwrap();
    assert_eq!(chat.list_messages(group.id).await.unwrap().len(), 8);
    assert_eq!(group.member_count, 9);
    assert_eq!(group.member_count, group.member_ids.len());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_send_to_inactive_or_unknown_group() {
    let chat = ChatRepository::new(pool().await);
    let creator = session("Ana");
    let group = chat
        .create_group(
            &creator,
            &NewChatGroup {
                name: "Arquivado".to_string(),
                description: "Fechado".to_string(),
                category: None,
                icon: None,
            }
            .validate()
            .unwrap(),
        )
        .await
        .unwrap();
    chat.toggle_active(group.id).await.unwrap();

    assert!(matches!(
        chat.send_message(group.id, &creator, "oi").await.unwrap(),
        SendOutcome::GroupInactive
    ));
    assert!(matches!(
        chat.send_message(Uuid::new_v4(), &creator, "oi").await.unwrap(),
        SendOutcome::GroupNotFound
    ));
}
