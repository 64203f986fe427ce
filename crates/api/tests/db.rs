//! Database-backed tests for the uniqueness, ownership, and import
//! invariants. Each test runs against its own database provisioned by
//! `#[sqlx::test]` from `DATABASE_URL`, with migrations applied.

#![allow(clippy::unwrap_used)]

use sqlx::PgPool;

use phonebook_core::{Email, MobileNumber, UserId};

use phonebook_api::db::UserRepository;
use phonebook_api::models::NewContact;
use phonebook_api::services::contacts::{ContactError, ContactService};

async fn create_user(pool: &PgPool, email: &str) -> UserId {
    let users = UserRepository::new(pool);
    let email = Email::parse(email).unwrap();
    users
        .create("user1", &email, "$argon2id$fake$hash")
        .await
        .unwrap()
        .id
}

fn contact_input(name: &str, email: &str, mobile: &str) -> NewContact {
    NewContact {
        name: name.to_owned(),
        email: Email::parse(email).unwrap(),
        mobile_number: MobileNumber::parse(mobile).unwrap(),
    }
}

#[sqlx::test]
async fn duplicate_email_for_same_owner_is_rejected(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;
    let service = ContactService::new(&pool);

    service
        .create(contact_input("contact1", "contact1@test.com", "0121234511"), owner)
        .await
        .unwrap();

    // Same email, different mobile number.
    let result = service
        .create(contact_input("contact2", "contact1@test.com", "0121234522"), owner)
        .await;
    assert!(matches!(result, Err(ContactError::AlreadyExists)));

    // Different email, same mobile number.
    let result = service
        .create(contact_input("contact2", "contact2@test.com", "0121234511"), owner)
        .await;
    assert!(matches!(result, Err(ContactError::AlreadyExists)));
}

#[sqlx::test]
async fn different_owners_may_hold_the_same_contact(pool: PgPool) {
    let owner_a = create_user(&pool, "a@test.com").await;
    let owner_b = create_user(&pool, "b@test.com").await;
    let service = ContactService::new(&pool);

    service
        .create(contact_input("contact1", "contact1@test.com", "0121234511"), owner_a)
        .await
        .unwrap();

    // Uniqueness is owner-scoped, not global.
    service
        .create(contact_input("contact1", "contact1@test.com", "0121234511"), owner_b)
        .await
        .unwrap();
}

#[sqlx::test]
async fn get_hides_other_owners_contacts(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;
    let other = create_user(&pool, "other@test.com").await;
    let service = ContactService::new(&pool);

    let contact = service
        .create(contact_input("contact1", "contact1@test.com", "0121234511"), owner)
        .await
        .unwrap();

    assert!(service.get(contact.id, owner).await.is_ok());

    // Another user's lookup must not reveal that the record exists.
    let result = service.get(contact.id, other).await;
    assert!(matches!(result, Err(ContactError::NotFound)));
}

#[sqlx::test]
async fn update_to_anothers_email_is_a_conflict(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;
    let service = ContactService::new(&pool);

    service
        .create(contact_input("contact1", "contact1@test.com", "0121234511"), owner)
        .await
        .unwrap();
    let second = service
        .create(contact_input("contact2", "contact2@test.com", "0121234522"), owner)
        .await
        .unwrap();

    // Steal contact1's email while keeping contact2's own mobile number.
    let result = service
        .update(
            second.id,
            owner,
            contact_input("contact2", "contact1@test.com", "0121234522"),
        )
        .await;
    assert!(matches!(result, Err(ContactError::DuplicateField)));
}

#[sqlx::test]
async fn update_by_non_owner_is_forbidden(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;
    let other = create_user(&pool, "other@test.com").await;
    let service = ContactService::new(&pool);

    let contact = service
        .create(contact_input("contact1", "contact1@test.com", "0121234511"), owner)
        .await
        .unwrap();

    let result = service
        .update(
            contact.id,
            other,
            contact_input("intruder", "intruder@test.com", "0121234533"),
        )
        .await;
    assert!(matches!(result, Err(ContactError::NotOwner)));
}

#[sqlx::test]
async fn importing_three_rows_creates_three_contacts(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;
    let service = ContactService::new(&pool);

    let rows = vec![
        contact_input("contact1", "contact1@test.com", "0121234511"),
        contact_input("contact2", "contact2@test.com", "0121234522"),
        contact_input("contact3", "contact3@test.com", "0121234533"),
    ];

    service.import_contacts(owner, &rows).await.unwrap();

    let (contacts, meta) = service.list(owner, None, None, None).await.unwrap();
    assert_eq!(meta.total, 3);
    assert_eq!(contacts.len(), 3);
}

#[sqlx::test]
async fn reimporting_updates_instead_of_duplicating(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;
    let service = ContactService::new(&pool);

    let rows = vec![contact_input("contact1", "contact1@test.com", "0121234511")];
    service.import_contacts(owner, &rows).await.unwrap();

    // Same email keys the upsert onto the existing record.
    let rows = vec![contact_input("renamed", "contact1@test.com", "0121234511")];
    service.import_contacts(owner, &rows).await.unwrap();

    let (contacts, meta) = service.list(owner, None, None, None).await.unwrap();
    assert_eq!(meta.total, 1);
    assert_eq!(contacts[0].name, "renamed");
}

#[sqlx::test]
async fn import_conflict_is_a_conflict_and_rolls_back(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;
    let service = ContactService::new(&pool);

    service
        .create(contact_input("contact1", "contact1@test.com", "0121234511"), owner)
        .await
        .unwrap();
    service
        .create(contact_input("contact2", "contact2@test.com", "0121234522"), owner)
        .await
        .unwrap();

    // Matches contact1 by email but claims contact2's mobile number: the
    // upsert of contact1 trips the owner-scoped mobile index.
    let rows = vec![
        contact_input("contact3", "contact3@test.com", "0121234533"),
        contact_input("contact1", "contact1@test.com", "0121234522"),
    ];
    let result = service.import_contacts(owner, &rows).await;
    assert!(matches!(result, Err(ContactError::DuplicateField)));

    // The whole batch rolled back: contact3 was not inserted and contact1
    // kept its mobile number.
    let (contacts, meta) = service.list(owner, None, None, None).await.unwrap();
    assert_eq!(meta.total, 2);
    let contact1 = contacts
        .iter()
        .find(|c| c.email.as_str() == "contact1@test.com")
        .unwrap();
    assert_eq!(contact1.mobile_number.as_str(), "0121234511");
}
