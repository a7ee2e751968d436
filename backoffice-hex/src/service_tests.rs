//! PaymentService / PostService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use backoffice_repo::security;
    use backoffice_types::{
        Actor, AppError, BackofficeRepository, CreatePaymentRequest, CreatePostRequest,
        CreateTransactionRequest, Employee, EmployeeId, Payment, PaymentId, PaymentMethod,
        PaymentMethodId, PaymentStatus, PaymentTransaction, Post, PostId, PostStatus, PostType,
        PostTypeId, RepoError, Role, TransactionId, TransactionKind, UpdatePaymentRequest,
        UpdateTransactionNotesRequest,
    };

    use crate::{PaymentService, PostService};

    /// Simple in-memory repository for testing the service layer.
    pub struct MockRepo {
        payments: Mutex<HashMap<PaymentId, Payment>>,
        transactions: Mutex<Vec<PaymentTransaction>>,
        posts: Mutex<HashMap<PostId, Post>>,
        methods: Mutex<HashMap<PaymentMethodId, PaymentMethod>>,
        post_types: Mutex<HashMap<PostTypeId, PostType>>,
        employees: Mutex<HashMap<EmployeeId, Employee>>,
    }

    impl MockRepo {
        pub fn new() -> Self {
            Self {
                payments: Mutex::new(HashMap::new()),
                transactions: Mutex::new(Vec::new()),
                posts: Mutex::new(HashMap::new()),
                methods: Mutex::new(HashMap::new()),
                post_types: Mutex::new(HashMap::new()),
                employees: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl BackofficeRepository for MockRepo {
        async fn create_payment(&self, payment: &Payment) -> Result<(), RepoError> {
            self.payments
                .lock()
                .unwrap()
                .insert(payment.id, payment.clone());
            Ok(())
        }

        async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
            Ok(self.payments.lock().unwrap().get(&id).cloned())
        }

        async fn list_payments(&self) -> Result<Vec<Payment>, RepoError> {
            Ok(self.payments.lock().unwrap().values().cloned().collect())
        }

        async fn update_payment(&self, payment: &Payment) -> Result<(), RepoError> {
            let mut payments = self.payments.lock().unwrap();
            if !payments.contains_key(&payment.id) {
                return Err(RepoError::NotFound);
            }
            payments.insert(payment.id, payment.clone());
            Ok(())
        }

        async fn record_transaction(&self, tx: &PaymentTransaction) -> Result<(), RepoError> {
            let mut transactions = self.transactions.lock().unwrap();
            let duplicate = transactions.iter().any(|t| {
                t.payment_id == tx.payment_id
                    && t.payment_method_id == tx.payment_method_id
                    && t.transaction_date == tx.transaction_date
            });
            if duplicate {
                return Err(RepoError::Conflict("duplicate transaction".into()));
            }
            transactions.push(tx.clone());
            Ok(())
        }

        async fn list_transactions_for_payment(
            &self,
            payment_id: PaymentId,
        ) -> Result<Vec<PaymentTransaction>, RepoError> {
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.payment_id == payment_id)
                .cloned()
                .collect())
        }

        async fn update_transaction_notes(
            &self,
            id: TransactionId,
            reference: Option<String>,
            notes: Option<String>,
        ) -> Result<Option<PaymentTransaction>, RepoError> {
            let mut transactions = self.transactions.lock().unwrap();
            let Some(tx) = transactions.iter_mut().find(|t| t.id == id) else {
                return Ok(None);
            };
            if let Some(reference) = reference {
                tx.reference = Some(reference);
            }
            if let Some(notes) = notes {
                tx.notes = Some(notes);
            }
            Ok(Some(tx.clone()))
        }

        async fn create_post(&self, post: &Post) -> Result<(), RepoError> {
            self.posts.lock().unwrap().insert(post.id, post.clone());
            Ok(())
        }

        async fn get_post(&self, id: PostId) -> Result<Option<Post>, RepoError> {
            Ok(self.posts.lock().unwrap().get(&id).cloned())
        }

        async fn list_posts(&self) -> Result<Vec<Post>, RepoError> {
            Ok(self.posts.lock().unwrap().values().cloned().collect())
        }

        async fn list_posts_by_author(
            &self,
            employee_id: EmployeeId,
        ) -> Result<Vec<Post>, RepoError> {
            Ok(self
                .posts
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.employee_id == employee_id)
                .cloned()
                .collect())
        }

        async fn set_post_status(
            &self,
            id: PostId,
            status: PostStatus,
            publish_date: Option<DateTime<Utc>>,
        ) -> Result<(), RepoError> {
            let mut posts = self.posts.lock().unwrap();
            let post = posts.get_mut(&id).ok_or(RepoError::NotFound)?;
            post.status = status;
            if publish_date.is_some() {
                post.publish_date = publish_date;
            }
            Ok(())
        }

        async fn create_payment_method(&self, method: &PaymentMethod) -> Result<(), RepoError> {
            self.methods
                .lock()
                .unwrap()
                .insert(method.id, method.clone());
            Ok(())
        }

        async fn get_payment_method(
            &self,
            id: PaymentMethodId,
        ) -> Result<Option<PaymentMethod>, RepoError> {
            Ok(self.methods.lock().unwrap().get(&id).cloned())
        }

        async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, RepoError> {
            Ok(self.methods.lock().unwrap().values().cloned().collect())
        }

        async fn create_post_type(&self, post_type: &PostType) -> Result<(), RepoError> {
            self.post_types
                .lock()
                .unwrap()
                .insert(post_type.id, post_type.clone());
            Ok(())
        }

        async fn get_post_type(&self, id: PostTypeId) -> Result<Option<PostType>, RepoError> {
            Ok(self.post_types.lock().unwrap().get(&id).cloned())
        }

        async fn list_post_types(&self) -> Result<Vec<PostType>, RepoError> {
            Ok(self.post_types.lock().unwrap().values().cloned().collect())
        }

        async fn create_employee(
            &self,
            name: &str,
            role: Role,
        ) -> Result<(Employee, String), RepoError> {
            let token = security::generate_token();
            let employee = Employee::new(name.to_string(), role, security::hash_token(&token));
            self.employees
                .lock()
                .unwrap()
                .insert(employee.id, employee.clone());
            Ok((employee, token))
        }

        async fn verify_token_hash(
            &self,
            token_hash: &str,
        ) -> Result<Option<Employee>, RepoError> {
            Ok(self
                .employees
                .lock()
                .unwrap()
                .values()
                .find(|e| e.token_hash == token_hash && e.is_active)
                .cloned())
        }

        async fn count_employees(&self) -> Result<i64, RepoError> {
            Ok(self.employees.lock().unwrap().len() as i64)
        }

        async fn list_employees(&self) -> Result<Vec<Employee>, RepoError> {
            Ok(self.employees.lock().unwrap().values().cloned().collect())
        }

        async fn deactivate_employee(&self, id: EmployeeId) -> Result<bool, RepoError> {
            let mut employees = self.employees.lock().unwrap();
            match employees.get_mut(&id) {
                Some(employee) => {
                    employee.is_active = false;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fixtures
    // ─────────────────────────────────────────────────────────────────────────

    struct Fixture {
        repo: Arc<MockRepo>,
        payments: PaymentService<MockRepo>,
        posts: PostService<MockRepo>,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MockRepo::new());
        Fixture {
            payments: PaymentService::new(repo.clone()),
            posts: PostService::new(repo.clone()),
            repo,
        }
    }

    async fn seed_payment(f: &Fixture, due: i64) -> Payment {
        f.payments
            .create_payment(CreatePaymentRequest {
                booking_id: Uuid::new_v4(),
                amount_due: due,
                notes: None,
            })
            .await
            .unwrap()
    }

    async fn seed_method(f: &Fixture) -> PaymentMethod {
        let method = PaymentMethod::new("Cash desk".to_string()).unwrap();
        f.repo.create_payment_method(&method).await.unwrap();
        method
    }

    fn tx_request(method: &PaymentMethod, kind: TransactionKind, amount: i64) -> CreateTransactionRequest {
        CreateTransactionRequest {
            payment_method_id: method.id,
            kind,
            amount,
            reference: None,
            notes: None,
        }
    }

    async fn seed_post_type(f: &Fixture) -> PostType {
        let post_type = PostType::new("Travel guide".to_string()).unwrap();
        f.repo.create_post_type(&post_type).await.unwrap();
        post_type
    }

    fn employee_actor() -> Actor {
        Actor::new(EmployeeId::new(), Role::Employee)
    }

    fn admin_actor() -> Actor {
        Actor::new(EmployeeId::new(), Role::Admin)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payment service
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_payment_success() {
        let f = fixture();

        let payment = seed_payment(&f, 10_000).await;

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.amount_due.minor(), 10_000);
    }

    #[tokio::test]
    async fn test_create_payment_rejects_non_positive_amount() {
        let f = fixture();

        for amount in [0, -500] {
            let result = f
                .payments
                .create_payment(CreatePaymentRequest {
                    booking_id: Uuid::new_v4(),
                    amount_due: amount,
                    notes: None,
                })
                .await;
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
    }

    #[tokio::test]
    async fn test_deposit_within_cap_accepted() {
        let f = fixture();
        let payment = seed_payment(&f, 10_000).await;
        let method = seed_method(&f).await;

        let tx = f
            .payments
            .record_transaction(payment.id, tx_request(&method, TransactionKind::Deposit, 8_000))
            .await
            .unwrap();

        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert_eq!(tx.amount.minor(), 8_000);
    }

    #[tokio::test]
    async fn test_deposit_over_cap_rejected() {
        let f = fixture();
        let payment = seed_payment(&f, 10_000).await;
        let method = seed_method(&f).await;

        let result = f
            .payments
            .record_transaction(payment.id, tx_request(&method, TransactionKind::Deposit, 8_001))
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_transaction_rejects_non_positive_amount() {
        let f = fixture();
        let payment = seed_payment(&f, 10_000).await;
        let method = seed_method(&f).await;

        let result = f
            .payments
            .record_transaction(payment.id, tx_request(&method, TransactionKind::Deposit, 0))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_transaction_on_missing_payment() {
        let f = fixture();
        let method = seed_method(&f).await;

        let result = f
            .payments
            .record_transaction(
                PaymentId::new(),
                tx_request(&method, TransactionKind::Payment, 1_000),
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_transaction_with_unknown_method() {
        let f = fixture();
        let payment = seed_payment(&f, 10_000).await;

        let result = f
            .payments
            .record_transaction(
                payment.id,
                CreateTransactionRequest {
                    payment_method_id: PaymentMethodId::new(),
                    kind: TransactionKind::Payment,
                    amount: 10_000,
                    reference: None,
                    notes: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_settlement_and_refund_scenario() {
        // due 100.00: deposit 60 -> final 40 -> refund 50 -> refund 60 rejected
        let f = fixture();
        let payment = seed_payment(&f, 10_000).await;
        let method = seed_method(&f).await;

        f.payments
            .record_transaction(payment.id, tx_request(&method, TransactionKind::Deposit, 6_000))
            .await
            .unwrap();

        // wrong final amount is rejected, exact remainder is accepted
        let result = f
            .payments
            .record_transaction(payment.id, tx_request(&method, TransactionKind::Final, 3_999))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        f.payments
            .record_transaction(payment.id, tx_request(&method, TransactionKind::Final, 4_000))
            .await
            .unwrap();

        // refund is blocked while the payment is still pending
        let result = f
            .payments
            .record_transaction(payment.id, tx_request(&method, TransactionKind::Refund, 5_000))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        f.payments
            .update_payment(
                payment.id,
                UpdatePaymentRequest {
                    status: Some(PaymentStatus::Complete),
                    amount_paid: Some(10_000),
                    payment_date: Some(Utc::now()),
                    notes: None,
                },
            )
            .await
            .unwrap();

        f.payments
            .record_transaction(payment.id, tx_request(&method, TransactionKind::Refund, 5_000))
            .await
            .unwrap();

        let result = f
            .payments
            .record_transaction(payment.id, tx_request(&method, TransactionKind::Refund, 6_000))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_transactions_is_idempotent() {
        let f = fixture();
        let payment = seed_payment(&f, 10_000).await;
        let method = seed_method(&f).await;

        f.payments
            .record_transaction(payment.id, tx_request(&method, TransactionKind::Deposit, 4_000))
            .await
            .unwrap();

        let first = f.payments.list_transactions(payment.id).await.unwrap();
        let second = f.payments.list_transactions(payment.id).await.unwrap();

        let ids = |txs: &[PaymentTransaction]| {
            txs.iter().map(|t| t.id).collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[tokio::test]
    async fn test_update_transaction_notes() {
        let f = fixture();
        let payment = seed_payment(&f, 10_000).await;
        let method = seed_method(&f).await;

        let tx = f
            .payments
            .record_transaction(payment.id, tx_request(&method, TransactionKind::Payment, 10_000))
            .await
            .unwrap();

        let updated = f
            .payments
            .update_transaction_notes(
                tx.id,
                UpdateTransactionNotesRequest {
                    reference: Some("slip-42".to_string()),
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.reference.as_deref(), Some("slip-42"));

        let missing = f
            .payments
            .update_transaction_notes(TransactionId::new(), UpdateTransactionNotesRequest::default())
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Post service
    // ─────────────────────────────────────────────────────────────────────────

    async fn seed_draft(f: &Fixture, author: &Actor) -> Post {
        let post_type = seed_post_type(f).await;
        f.posts
            .create_post(
                author,
                CreatePostRequest {
                    title: "Petra day trip".to_string(),
                    body: "Full-day guided tour.".to_string(),
                    slug: format!("petra-day-trip-{}", Uuid::new_v4()),
                    post_type_id: post_type.id,
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_post_owned_by_actor() {
        let f = fixture();
        let author = employee_actor();

        let post = seed_draft(&f, &author).await;

        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.employee_id, author.employee_id);
    }

    #[tokio::test]
    async fn test_create_post_with_unknown_type() {
        let f = fixture();

        let result = f
            .posts
            .create_post(
                &employee_actor(),
                CreatePostRequest {
                    title: "Petra".to_string(),
                    body: "body".to_string(),
                    slug: "petra".to_string(),
                    post_type_id: PostTypeId::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_submission_and_approval_flow() {
        // emp1 drafts -> emp1 submits -> non-admin approve rejected -> admin approve
        let f = fixture();
        let author = employee_actor();
        let post = seed_draft(&f, &author).await;

        let submitted = f.posts.submit(&author, post.id).await.unwrap();
        assert_eq!(submitted.status, PostStatus::Pending);

        // a second submit must fail: the post is no longer a draft
        let result = f.posts.submit(&author, post.id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let result = f.posts.approve(&author, post.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let published = f.posts.approve(&admin_actor(), post.id).await.unwrap();
        assert_eq!(published.status, PostStatus::Published);
        assert!(published.publish_date.is_some());
    }

    #[tokio::test]
    async fn test_submit_by_non_owner_forbidden() {
        let f = fixture();
        let author = employee_actor();
        let post = seed_draft(&f, &author).await;

        let result = f.posts.submit(&employee_actor(), post.id).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_reject_then_delete_flow() {
        let f = fixture();
        let author = employee_actor();
        let admin = admin_actor();
        let post = seed_draft(&f, &author).await;

        f.posts.submit(&author, post.id).await.unwrap();
        let rejected = f.posts.reject(&admin, post.id).await.unwrap();
        assert_eq!(rejected.status, PostStatus::Unpublished);

        // only the owner may delete, even for an admin
        let result = f.posts.delete(&admin, post.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let deleted = f.posts.delete(&author, post.id).await.unwrap();
        assert_eq!(deleted.status, PostStatus::Deleted);
    }

    #[tokio::test]
    async fn test_unpublish_restore_cycle() {
        let f = fixture();
        let author = employee_actor();
        let admin = admin_actor();
        let post = seed_draft(&f, &author).await;

        f.posts.submit(&author, post.id).await.unwrap();
        f.posts.approve(&admin, post.id).await.unwrap();

        let down = f.posts.unpublish(&admin, post.id).await.unwrap();
        assert_eq!(down.status, PostStatus::Unpublished);

        let back = f.posts.restore(&admin, post.id).await.unwrap();
        assert_eq!(back.status, PostStatus::Published);
    }

    #[tokio::test]
    async fn test_read_access_is_role_filtered() {
        let f = fixture();
        let author = employee_actor();
        let other = employee_actor();
        let admin = admin_actor();
        let post = seed_draft(&f, &author).await;

        assert!(f.posts.get_post(&author, post.id).await.is_ok());
        assert!(f.posts.get_post(&admin, post.id).await.is_ok());

        let result = f.posts.get_post(&other, post.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_posts_is_role_filtered() {
        let f = fixture();
        let emp1 = employee_actor();
        let emp2 = employee_actor();
        let admin = admin_actor();

        seed_draft(&f, &emp1).await;
        seed_draft(&f, &emp1).await;
        seed_draft(&f, &emp2).await;

        assert_eq!(f.posts.list_posts(&admin).await.unwrap().len(), 3);
        assert_eq!(f.posts.list_posts(&emp1).await.unwrap().len(), 2);
        assert_eq!(f.posts.list_posts(&emp2).await.unwrap().len(), 1);
    }
}
