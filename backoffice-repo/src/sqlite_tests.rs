//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use backoffice_types::{
        BackofficeRepository, Money, Payment, PaymentId, PaymentMethod, PaymentStatus,
        PaymentTransaction, Post, PostStatus, PostType, RepoError, Role, TransactionId,
        TransactionKind,
    };
    use chrono::Utc;
    use uuid::Uuid;

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    async fn seed_payment(repo: &SqliteRepo, due: i64) -> Payment {
        let payment = Payment::new(Uuid::new_v4(), Money::new(due).unwrap(), None).unwrap();
        repo.create_payment(&payment).await.unwrap();
        payment
    }

    async fn seed_method(repo: &SqliteRepo, name: &str) -> PaymentMethod {
        let method = PaymentMethod::new(name.to_string()).unwrap();
        repo.create_payment_method(&method).await.unwrap();
        method
    }

    #[tokio::test]
    async fn test_create_and_get_payment() {
        let repo = setup_repo().await;

        let created = seed_payment(&repo, 10_000).await;
        let fetched = repo.get_payment(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.booking_id, created.booking_id);
        assert_eq!(fetched.status, PaymentStatus::Pending);
        assert_eq!(fetched.amount_due.minor(), 10_000);
        assert!(fetched.amount_paid.is_zero());
    }

    #[tokio::test]
    async fn test_get_payment_not_found() {
        let repo = setup_repo().await;

        let result = repo.get_payment(PaymentId::new()).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_payments() {
        let repo = setup_repo().await;

        seed_payment(&repo, 5_000).await;
        seed_payment(&repo, 7_500).await;

        let payments = repo.list_payments().await.unwrap();

        assert_eq!(payments.len(), 2);
    }

    #[tokio::test]
    async fn test_update_payment() {
        let repo = setup_repo().await;

        let mut payment = seed_payment(&repo, 10_000).await;
        payment.status = PaymentStatus::Complete;
        payment.amount_paid = Money::new(10_000).unwrap();
        payment.payment_date = Some(Utc::now());
        payment.notes = Some("settled at the desk".to_string());

        repo.update_payment(&payment).await.unwrap();

        let fetched = repo.get_payment(payment.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, PaymentStatus::Complete);
        assert_eq!(fetched.amount_paid.minor(), 10_000);
        assert!(fetched.payment_date.is_some());
        assert_eq!(fetched.notes.as_deref(), Some("settled at the desk"));
    }

    #[tokio::test]
    async fn test_update_missing_payment_fails() {
        let repo = setup_repo().await;

        let payment = Payment::new(Uuid::new_v4(), Money::new(100).unwrap(), None).unwrap();
        let result = repo.update_payment(&payment).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_record_and_list_transactions() {
        let repo = setup_repo().await;

        let payment = seed_payment(&repo, 10_000).await;
        let method = seed_method(&repo, "Cash desk").await;

        let tx = PaymentTransaction::new(
            payment.id,
            method.id,
            TransactionKind::Deposit,
            Money::new(6_000).unwrap(),
            Some("slip-17".to_string()),
            None,
        );
        repo.record_transaction(&tx).await.unwrap();

        let history = repo.list_transactions_for_payment(payment.id).await.unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, tx.id);
        assert_eq!(history[0].kind, TransactionKind::Deposit);
        assert_eq!(history[0].amount.minor(), 6_000);
        assert_eq!(history[0].reference.as_deref(), Some("slip-17"));
    }

    #[tokio::test]
    async fn test_duplicate_transaction_conflicts() {
        let repo = setup_repo().await;

        let payment = seed_payment(&repo, 10_000).await;
        let method = seed_method(&repo, "Cash desk").await;

        let tx = PaymentTransaction::new(
            payment.id,
            method.id,
            TransactionKind::Deposit,
            Money::new(6_000).unwrap(),
            None,
            None,
        );
        repo.record_transaction(&tx).await.unwrap();

        // same payment, method and timestamp: the unique index rejects it
        let duplicate = PaymentTransaction::from_parts(
            TransactionId::new(),
            TransactionKind::Final,
            Money::new(4_000).unwrap(),
            tx.transaction_date,
            payment.id,
            method.id,
            None,
            None,
        );
        let result = repo.record_transaction(&duplicate).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_transaction_notes() {
        let repo = setup_repo().await;

        let payment = seed_payment(&repo, 10_000).await;
        let method = seed_method(&repo, "Visa terminal").await;

        let tx = PaymentTransaction::new(
            payment.id,
            method.id,
            TransactionKind::Payment,
            Money::new(10_000).unwrap(),
            None,
            None,
        );
        repo.record_transaction(&tx).await.unwrap();

        let updated = repo
            .update_transaction_notes(tx.id, Some("slip-99".to_string()), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.reference.as_deref(), Some("slip-99"));
        // immutable fields untouched
        assert_eq!(updated.amount.minor(), 10_000);
        assert_eq!(updated.kind, TransactionKind::Payment);
    }

    #[tokio::test]
    async fn test_update_notes_of_missing_transaction() {
        let repo = setup_repo().await;

        let result = repo
            .update_transaction_notes(TransactionId::new(), None, Some("x".to_string()))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_post_round_trip_and_status() {
        let repo = setup_repo().await;

        let (author, _token) = repo.create_employee("emp1", Role::Employee).await.unwrap();
        let post_type = PostType::new("Travel guide".to_string()).unwrap();
        repo.create_post_type(&post_type).await.unwrap();

        let post = Post::new(
            "Wadi Rum overnight".to_string(),
            "Camp under the stars.".to_string(),
            "wadi-rum-overnight".to_string(),
            author.id,
            post_type.id,
        )
        .unwrap();
        repo.create_post(&post).await.unwrap();

        let fetched = repo.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, PostStatus::Draft);
        assert_eq!(fetched.employee_id, author.id);

        let now = Utc::now();
        repo.set_post_status(post.id, PostStatus::Published, Some(now))
            .await
            .unwrap();

        let published = repo.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(published.status, PostStatus::Published);
        assert!(published.publish_date.is_some());

        // status-only update keeps the original publish date
        repo.set_post_status(post.id, PostStatus::Unpublished, None)
            .await
            .unwrap();
        let unpublished = repo.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(unpublished.status, PostStatus::Unpublished);
        assert_eq!(unpublished.publish_date, published.publish_date);
    }

    #[tokio::test]
    async fn test_list_posts_by_author() {
        let repo = setup_repo().await;

        let (emp1, _) = repo.create_employee("emp1", Role::Employee).await.unwrap();
        let (emp2, _) = repo.create_employee("emp2", Role::Employee).await.unwrap();
        let post_type = PostType::new("News".to_string()).unwrap();
        repo.create_post_type(&post_type).await.unwrap();

        for (i, author) in [&emp1, &emp1, &emp2].iter().enumerate() {
            let post = Post::new(
                format!("Post {}", i),
                "body".to_string(),
                format!("post-{}", i),
                author.id,
                post_type.id,
            )
            .unwrap();
            repo.create_post(&post).await.unwrap();
        }

        assert_eq!(repo.list_posts().await.unwrap().len(), 3);
        assert_eq!(repo.list_posts_by_author(emp1.id).await.unwrap().len(), 2);
        assert_eq!(repo.list_posts_by_author(emp2.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let repo = setup_repo().await;

        let (author, _) = repo.create_employee("emp1", Role::Employee).await.unwrap();
        let post_type = PostType::new("News".to_string()).unwrap();
        repo.create_post_type(&post_type).await.unwrap();

        let first = Post::new(
            "One".to_string(),
            "body".to_string(),
            "same-slug".to_string(),
            author.id,
            post_type.id,
        )
        .unwrap();
        repo.create_post(&first).await.unwrap();

        let second = Post::new(
            "Two".to_string(),
            "body".to_string(),
            "same-slug".to_string(),
            author.id,
            post_type.id,
        )
        .unwrap();
        let result = repo.create_post(&second).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_payment_methods_and_post_types() {
        let repo = setup_repo().await;

        let method = seed_method(&repo, "Bank transfer").await;
        let fetched = repo.get_payment_method(method.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Bank transfer");
        assert_eq!(repo.list_payment_methods().await.unwrap().len(), 1);

        let post_type = PostType::new("Offer".to_string()).unwrap();
        repo.create_post_type(&post_type).await.unwrap();
        let fetched = repo.get_post_type(post_type.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Offer");
        assert_eq!(repo.list_post_types().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_employee_token_verification() {
        let repo = setup_repo().await;

        assert_eq!(repo.count_employees().await.unwrap(), 0);

        let (employee, token) = repo.create_employee("Admin", Role::Admin).await.unwrap();
        assert_eq!(repo.count_employees().await.unwrap(), 1);

        let hash = crate::security::hash_token(&token);
        let verified = repo.verify_token_hash(&hash).await.unwrap().unwrap();
        assert_eq!(verified.id, employee.id);
        assert_eq!(verified.role, Role::Admin);
        assert!(verified.last_seen_at.is_some());

        let miss = repo
            .verify_token_hash(&crate::security::hash_token("bo_wrong"))
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_deactivated_employee_cannot_authenticate() {
        let repo = setup_repo().await;

        let (employee, token) = repo.create_employee("emp", Role::Employee).await.unwrap();
        assert!(repo.deactivate_employee(employee.id).await.unwrap());

        let hash = crate::security::hash_token(&token);
        let verified = repo.verify_token_hash(&hash).await.unwrap();
        assert!(verified.is_none());

        // deactivating again reports no change
        // (the row still exists, but UPDATE matches it; it stays false)
        assert!(repo.deactivate_employee(employee.id).await.unwrap());

        let employees = repo.list_employees().await.unwrap();
        assert_eq!(employees.len(), 1);
        assert!(!employees[0].is_active);
    }
}
