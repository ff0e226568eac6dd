use clap::{Arg, Command}; // Import necessary modules from clap for command-line argument parsing
use rpassword::read_password; // For securely reading secrets off the terminal
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use taskwarden::auth::{JsonCredentialStore, PasswordHasher};
use taskwarden::email::{SmtpMailer, MailTransport};
use taskwarden::notify::SweepScheduler;
use taskwarden::tasks::JsonTodoStore;
use taskwarden::utils::io::is_valid_email;
use taskwarden::utils::logging::initialize_logging;
use taskwarden::{AppConfig, AuthLifecycle, CredentialStore, NotificationSweep, TodoStore, TokenService};

fn main() {
    if let Err(e) = initialize_logging() {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    // All configuration comes from the environment exactly once, here
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Define the command-line interface using clap
    let matches = Command::new("taskwarden")
        .about("Todo backend core: account lifecycle and overdue-task reminders")
        .subcommand(
            Command::new("register")
                .about("Register a new account and send its verification email")
                .arg(
                    Arg::new("email")
                        .help("The email address to register")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("login")
                .about("Log in and print a session token")
                .arg(
                    Arg::new("email")
                        .help("The email address to log in as")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("verify")
                .about("Redeem an email verification token")
                .arg(
                    Arg::new("token")
                        .help("The token from the verification link")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("resend")
                .about("Send a fresh verification email for an account")
                .arg(
                    Arg::new("email")
                        .help("The email address to re-send to")
                        .required(true),
                ),
        )
        .subcommand(Command::new("sweep").about("Run one overdue-task reminder sweep now"))
        .subcommand(
            Command::new("serve")
                .about("Run the reminder sweep on its configured period until stopped"),
        )
        .subcommand(
            Command::new("test-email")
                .about("Send a test email to check the SMTP configuration")
                .arg(
                    Arg::new("to")
                        .help("The recipient of the test email")
                        .required(true),
                ),
        )
        .get_matches(); // Parse the command-line arguments

    // Wire the shared services from the configuration
    let accounts: Arc<dyn CredentialStore> =
        match JsonCredentialStore::open(Path::new(&config.users_file)) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                eprintln!("Failed to open account store: {}", e);
                std::process::exit(1);
            }
        };
    let todos: Arc<dyn TodoStore> = Arc::new(JsonTodoStore::open(Path::new(&config.todos_file)));
    let mailer: Arc<dyn MailTransport> = Arc::new(SmtpMailer::new(config.smtp.clone()));

    let auth = AuthLifecycle::new(
        accounts.clone(),
        mailer.clone(),
        PasswordHasher::new(config.hash_iterations),
        TokenService::new(&config.signing_key),
        &config.base_url,
    );

    // Handle the "register" subcommand
    if let Some(sub_matches) = matches.subcommand_matches("register") {
        let email = sub_matches.get_one::<String>("email").unwrap();
        if !is_valid_email(email) {
            eprintln!("Not a valid email address: {}", email);
            std::process::exit(1);
        }

        println!("Please enter a password:");
        let secret = read_password().expect("Failed to read password");

        match auth.register(email, &secret) {
            Ok(registration) => {
                println!("Account registered: {}", registration.account.identifier);
                if registration.verification.is_delivered() {
                    println!("Verification email sent. Check your inbox.");
                } else {
                    println!(
                        "The account was created, but the verification email could not \
                        be sent. Use the 'resend' command to try again."
                    );
                }
            }
            Err(e) => {
                eprintln!("Registration failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Handle the "login" subcommand
    if let Some(sub_matches) = matches.subcommand_matches("login") {
        let email = sub_matches.get_one::<String>("email").unwrap();

        println!("Please enter your password:");
        let secret = read_password().expect("Failed to read password");

        match auth.login(email, &secret) {
            Ok(Some(session)) => {
                println!("Login successful.");
                println!("Verified: {}", session.verified);
                println!("Session token: {}", session.token);
            }
            Ok(None) => {
                // Unknown account and wrong password print the same thing
                eprintln!("Invalid email or password.");
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Login failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Handle the "verify" subcommand
    if let Some(sub_matches) = matches.subcommand_matches("verify") {
        let token = sub_matches.get_one::<String>("token").unwrap();

        if auth.verify_email(token) {
            println!("Email verified. You're all set.");
        } else {
            eprintln!("This verification link is invalid or has expired.");
            std::process::exit(1);
        }
    }

    // Handle the "resend" subcommand
    if let Some(sub_matches) = matches.subcommand_matches("resend") {
        let email = sub_matches.get_one::<String>("email").unwrap();

        match auth.resend_verification(email) {
            // The same message either way; this command does not reveal
            // which addresses have accounts
            Ok(_) => println!("If that account exists, a verification email has been sent."),
            Err(e) => {
                eprintln!("Failed to send verification email: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Handle the "sweep" subcommand
    if matches.subcommand_matches("sweep").is_some() {
        let sweep = NotificationSweep::new(accounts.clone(), todos.clone(), mailer.clone());
        let summary = sweep.run();
        println!(
            "Sweep finished: {} accounts scanned, {} reminders sent, {} failures",
            summary.accounts_scanned, summary.reminders_sent, summary.failures
        );
    }

    // Handle the "serve" subcommand
    if matches.subcommand_matches("serve").is_some() {
        let sweep = NotificationSweep::new(accounts.clone(), todos.clone(), mailer.clone());
        let scheduler = SweepScheduler::new(Duration::from_secs(config.sweep_interval_secs));
        println!(
            "Scheduler started. The reminder sweep will run every {} seconds.",
            config.sweep_interval_secs
        );
        scheduler.start(sweep).join();
    }

    // Handle the "test-email" subcommand
    if let Some(sub_matches) = matches.subcommand_matches("test-email") {
        let to = sub_matches.get_one::<String>("to").unwrap();

        let result = mailer.send(
            to,
            "Test Email",
            "This is a test email from the TODO app.",
            Some("<h1>Test Email</h1><p>This is a test email sent from the TODO app using HTML.</p>"),
        );
        match result {
            Ok(()) => println!("Test email sent successfully!"),
            Err(e) => {
                eprintln!("Failed to send test email: {}", e);
                std::process::exit(1);
            }
        }
    }
}
