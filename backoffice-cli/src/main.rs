//! Back-office CLI
//!
//! Command-line interface for the back-office API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use backoffice_client::BackofficeClient;
use backoffice_types::{
    CreatePostRequest, PaymentId, PaymentMethodId, PaymentStatus, PostId, PostTypeId, Role,
    TransactionId, TransactionKind, UpdatePaymentRequest,
};

#[derive(Parser)]
#[command(name = "backoffice")]
#[command(author, version, about = "Back-office API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the back-office API
    #[arg(
        long,
        env = "BACKOFFICE_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    /// Bearer token for authentication
    #[arg(long, env = "BACKOFFICE_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment operations
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Payment transaction operations
    Transaction {
        #[command(subcommand)]
        action: TransactionCommands,
    },
    /// Post operations
    Post {
        #[command(subcommand)]
        action: PostCommands,
    },
    /// Staff management
    Staff {
        #[command(subcommand)]
        action: StaffCommands,
    },
    /// Reference data (payment methods, post types)
    Catalog {
        #[command(subcommand)]
        action: CatalogCommands,
    },
    /// Bootstrap the first admin account
    Bootstrap {
        /// Display name for the first admin
        #[arg(long, default_value = "bootstrap-admin")]
        name: String,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Create a payment for a booking
    Create {
        /// Booking ID (UUID)
        #[arg(long)]
        booking: String,
        /// Amount due in minor units (cents)
        #[arg(long)]
        amount_due: i64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Get payment details
    Get {
        /// Payment ID (UUID)
        id: String,
    },
    /// List all payments
    List,
    /// Update the mutable fields of a payment
    Update {
        /// Payment ID (UUID)
        id: String,
        /// New status (PENDING, COMPLETE, REFUND)
        #[arg(long)]
        status: Option<String>,
        /// Amount recorded as paid, in minor units
        #[arg(long)]
        amount_paid: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
enum TransactionCommands {
    /// Record a transaction against a payment
    Add {
        /// Payment ID (UUID)
        #[arg(long)]
        payment: String,
        /// Payment method ID (UUID)
        #[arg(long)]
        method: String,
        /// Kind (DEPOSIT, PAYMENT, FINAL, REFUND)
        #[arg(long)]
        kind: String,
        /// Amount in minor units (cents)
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        reference: Option<String>,
    },
    /// List the transaction history of a payment
    List {
        /// Payment ID (UUID)
        payment: String,
    },
    /// Amend the reference/notes of a recorded transaction
    Note {
        /// Transaction ID (UUID)
        id: String,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
enum PostCommands {
    /// Create a draft post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        slug: String,
        /// Post type ID (UUID)
        #[arg(long)]
        post_type: String,
    },
    /// Get post details
    Get {
        /// Post ID (UUID)
        id: String,
    },
    /// List posts visible to you
    List,
    /// Submit a draft for review
    Submit { id: String },
    /// Approve a pending post (admin)
    Approve { id: String },
    /// Reject a pending post (admin)
    Reject { id: String },
    /// Take a published post down (admin)
    Unpublish { id: String },
    /// Restore an unpublished post (admin)
    Restore { id: String },
    /// Delete an unpublished post you own
    Delete { id: String },
}

#[derive(Subcommand)]
enum StaffCommands {
    /// Create a staff account (admin)
    Create {
        #[arg(long)]
        name: String,
        /// Role (ADMIN or EMPLOYEE)
        #[arg(long, default_value = "EMPLOYEE")]
        role: String,
    },
    /// List staff accounts (admin)
    List,
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// Register a payment method (admin)
    AddMethod {
        #[arg(long)]
        name: String,
    },
    /// List payment methods
    Methods,
    /// Register a post type (admin)
    AddPostType {
        #[arg(long)]
        name: String,
    },
    /// List post types
    PostTypes,
}

fn parse_payment_id(s: &str) -> Result<PaymentId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid payment ID: {}", s))
}

fn parse_post_id(s: &str) -> Result<PostId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid post ID: {}", s))
}

fn parse_kind(s: &str) -> Result<TransactionKind> {
    s.parse().map_err(|e| anyhow::anyhow!("{}", e))
}

fn parse_role(s: &str) -> Result<Role> {
    s.parse().map_err(|e| anyhow::anyhow!("{}", e))
}

fn parse_status(s: &str) -> Result<PaymentStatus> {
    s.parse().map_err(|e| anyhow::anyhow!("{}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = BackofficeClient::new(&cli.api_url);
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Bootstrap { name } => {
            let created = client.bootstrap(&name).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }

        Commands::Payment { action } => match action {
            PaymentCommands::Create {
                booking,
                amount_due,
                notes,
            } => {
                let booking_id = booking
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid booking ID: {}", booking))?;
                let payment = client.create_payment(booking_id, amount_due, notes).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
            PaymentCommands::Get { id } => {
                let payment = client.get_payment(parse_payment_id(&id)?).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
            PaymentCommands::List => {
                let payments = client.list_payments().await?;
                println!("{}", serde_json::to_string_pretty(&payments)?);
            }
            PaymentCommands::Update {
                id,
                status,
                amount_paid,
                notes,
            } => {
                let req = UpdatePaymentRequest {
                    status: status.as_deref().map(parse_status).transpose()?,
                    amount_paid,
                    payment_date: None,
                    notes,
                };
                let payment = client.update_payment(parse_payment_id(&id)?, req).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
        },

        Commands::Transaction { action } => match action {
            TransactionCommands::Add {
                payment,
                method,
                kind,
                amount,
                reference,
            } => {
                let method_id: PaymentMethodId = method
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid payment method ID: {}", method))?;
                let tx = client
                    .record_transaction(
                        parse_payment_id(&payment)?,
                        method_id,
                        parse_kind(&kind)?,
                        amount,
                        reference,
                    )
                    .await?;
                println!("{}", serde_json::to_string_pretty(&tx)?);
            }
            TransactionCommands::List { payment } => {
                let history = client.list_transactions(parse_payment_id(&payment)?).await?;
                println!("{}", serde_json::to_string_pretty(&history)?);
            }
            TransactionCommands::Note {
                id,
                reference,
                notes,
            } => {
                let tx_id: TransactionId = id
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid transaction ID: {}", id))?;
                let tx = client.update_transaction_notes(tx_id, reference, notes).await?;
                println!("{}", serde_json::to_string_pretty(&tx)?);
            }
        },

        Commands::Post { action } => match action {
            PostCommands::Create {
                title,
                body,
                slug,
                post_type,
            } => {
                let post_type_id: PostTypeId = post_type
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid post type ID: {}", post_type))?;
                let post = client
                    .create_post(CreatePostRequest {
                        title,
                        body,
                        slug,
                        post_type_id,
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&post)?);
            }
            PostCommands::Get { id } => {
                let post = client.get_post(parse_post_id(&id)?).await?;
                println!("{}", serde_json::to_string_pretty(&post)?);
            }
            PostCommands::List => {
                let posts = client.list_posts().await?;
                println!("{}", serde_json::to_string_pretty(&posts)?);
            }
            PostCommands::Submit { id } => {
                let post = client.post_action(parse_post_id(&id)?, "submit").await?;
                println!("{}", serde_json::to_string_pretty(&post)?);
            }
            PostCommands::Approve { id } => {
                let post = client.post_action(parse_post_id(&id)?, "approve").await?;
                println!("{}", serde_json::to_string_pretty(&post)?);
            }
            PostCommands::Reject { id } => {
                let post = client.post_action(parse_post_id(&id)?, "reject").await?;
                println!("{}", serde_json::to_string_pretty(&post)?);
            }
            PostCommands::Unpublish { id } => {
                let post = client.post_action(parse_post_id(&id)?, "unpublish").await?;
                println!("{}", serde_json::to_string_pretty(&post)?);
            }
            PostCommands::Restore { id } => {
                let post = client.post_action(parse_post_id(&id)?, "restore").await?;
                println!("{}", serde_json::to_string_pretty(&post)?);
            }
            PostCommands::Delete { id } => {
                client.delete_post(parse_post_id(&id)?).await?;
                println!("✓ Post deleted");
            }
        },

        Commands::Staff { action } => match action {
            StaffCommands::Create { name, role } => {
                let created = client.create_staff(&name, parse_role(&role)?).await?;
                println!("{}", serde_json::to_string_pretty(&created)?);
            }
            StaffCommands::List => {
                let staff = client.list_staff().await?;
                println!("{}", serde_json::to_string_pretty(&staff)?);
            }
        },

        Commands::Catalog { action } => match action {
            CatalogCommands::AddMethod { name } => {
                let method = client.create_payment_method(&name).await?;
                println!("{}", serde_json::to_string_pretty(&method)?);
            }
            CatalogCommands::Methods => {
                let methods = client.list_payment_methods().await?;
                println!("{}", serde_json::to_string_pretty(&methods)?);
            }
            CatalogCommands::AddPostType { name } => {
                let post_type = client.create_post_type(&name).await?;
                println!("{}", serde_json::to_string_pretty(&post_type)?);
            }
            CatalogCommands::PostTypes => {
                let post_types = client.list_post_types().await?;
                println!("{}", serde_json::to_string_pretty(&post_types)?);
            }
        },
    }

    Ok(())
}
