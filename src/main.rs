use std::sync::Arc;

use clap::{Parser, Subcommand};

use nutritrack::foods::model::FoodItem;
use nutritrack::foods::search::{ScanOutcome, MIN_QUERY_LEN};
use nutritrack::meals::flow::AddMealFlow;
use nutritrack::meals::log::MealLog;
use nutritrack::meals::model::MealType;
use nutritrack::meals::nutrition::{self, GoalProgress};
use nutritrack::settings;
use nutritrack::state::AppState;

#[derive(Parser)]
#[command(
    name = "nutritrack",
    about = "Log meals and track daily calories against a goal"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the food database by text (3 characters minimum)
    Search { query: String },
    /// Look up a single product by barcode
    Scan { barcode: String },
    /// Save a meal composed from one or more barcodes
    Add {
        meal_type: MealType,
        #[arg(required = true)]
        barcodes: Vec<String>,
    },
    /// List saved meals, newest first
    List,
    /// Show one saved meal with its totals
    Show { id: String },
    /// Delete a saved meal by id
    Delete { id: String },
    /// Today's totals against the daily calorie goal
    Today,
    /// Show or set the daily calorie goal
    Goal { kcal: Option<f64> },
}

fn print_food(food: &FoodItem) {
    println!(
        "{:>13}  {} [{}]  {:.0} kcal/100g  Nutri-Score {}",
        food.id, food.name, food.brand, food.calories, food.nutriscore
    );
}

async fn run_search(state: &AppState, query: &str) -> anyhow::Result<()> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        anyhow::bail!("search needs at least {MIN_QUERY_LEN} characters");
    }
    let foods = state.lookup.by_text(query).await;
    if foods.is_empty() {
        println!("No results for \"{query}\".");
        return Ok(());
    }
    for food in &foods {
        print_food(food);
    }
    Ok(())
}

async fn run_scan(state: &AppState, barcode: &str) -> anyhow::Result<()> {
    match state.lookup.by_barcode(barcode.trim()).await {
        Some(food) => print_food(&food),
        None => println!("No product found for barcode {barcode}."),
    }
    Ok(())
}

async fn run_add(
    state: &AppState,
    meal_type: MealType,
    barcodes: &[String],
) -> anyhow::Result<()> {
    let mut flow = AddMealFlow::new(state);
    flow.select_type(meal_type);
    for code in barcodes {
        match flow.search().scan(code).await {
            ScanOutcome::Found(food) => {
                if !flow.is_selected(&food) {
                    println!("  + {} [{}]", food.name, food.brand);
                    flow.toggle(&food);
                }
            }
            ScanOutcome::NotFound => println!("  ? no product found for barcode {code}"),
        }
    }

    let meal = flow.save().await?;
    let totals = nutrition::meal_totals(&meal);
    println!(
        "Saved {} with {} food(s), {:.0} kcal.",
        meal.name,
        meal.foods.len(),
        totals.calories
    );
    Ok(())
}

async fn run_list(state: &AppState) -> anyhow::Result<()> {
    let mut log = MealLog::new(Arc::clone(&state.store));
    log.refresh().await;
    if log.meals().is_empty() {
        println!("No saved meals yet.");
        return Ok(());
    }
    let offset = nutrition::local_now().offset();
    for meal in log.meals() {
        let totals = nutrition::meal_totals(meal);
        println!(
            "{} {}  {:<9} {:>6.0} kcal  {} food(s)  id={}",
            meal.display_date(offset),
            meal.display_time(offset),
            meal.name,
            totals.calories,
            meal.foods.len(),
            meal.id
        );
    }
    Ok(())
}

async fn run_show(state: &AppState, id: &str) -> anyhow::Result<()> {
    let mut log = MealLog::new(Arc::clone(&state.store));
    log.refresh().await;
    let Some(meal) = log.find(id) else {
        anyhow::bail!("no meal with id {id}");
    };

    let offset = nutrition::local_now().offset();
    println!(
        "{} on {} at {}",
        meal.name,
        meal.display_date(offset),
        meal.display_time(offset)
    );
    for food in &meal.foods {
        print_food(food);
    }
    let totals = nutrition::meal_totals(meal);
    println!(
        "Total: {:.0} kcal, {:.1} g protein, {:.1} g carbs, {:.1} g fat",
        totals.calories, totals.protein_g, totals.carbs_g, totals.fat_g
    );
    Ok(())
}

async fn run_delete(state: &AppState, id: &str) -> anyhow::Result<()> {
    let mut log = MealLog::new(Arc::clone(&state.store));
    log.refresh().await;
    if log.find(id).is_none() {
        anyhow::bail!("no meal with id {id}");
    }
    log.delete(id).await;
    println!("Deleted meal {id}.");
    Ok(())
}

async fn run_today(state: &AppState) -> anyhow::Result<()> {
    let mut log = MealLog::new(Arc::clone(&state.store));
    log.refresh().await;

    let goal = settings::daily_goal(state.store.as_ref()).await;
    let totals = log.today_totals();
    let progress = GoalProgress::derive(goal, totals.calories);

    println!(
        "Today: {:.0} / {:.0} kcal ({:.0}%)",
        totals.calories, goal, progress.percent
    );
    if progress.exceeded {
        println!("Daily goal exceeded.");
    } else {
        println!("{:.0} kcal remaining.", progress.remaining);
    }
    println!(
        "Macros: {:.1} g protein, {:.1} g carbs, {:.1} g fat",
        totals.protein_g, totals.carbs_g, totals.fat_g
    );
    Ok(())
}

async fn run_goal(state: &AppState, kcal: Option<f64>) -> anyhow::Result<()> {
    match kcal {
        None => {
            let goal = settings::daily_goal(state.store.as_ref()).await;
            println!("Daily goal: {goal:.0} kcal");
        }
        Some(value) => {
            let saved = settings::save_daily_goal(state.store.as_ref(), value).await?;
            println!("Daily goal set to {saved:.0} kcal.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "nutritrack=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();
    let state = AppState::init();

    match cli.command {
        Command::Search { query } => run_search(&state, &query).await,
        Command::Scan { barcode } => run_scan(&state, &barcode).await,
        Command::Add {
            meal_type,
            barcodes,
        } => run_add(&state, meal_type, &barcodes).await,
        Command::List => run_list(&state).await,
        Command::Show { id } => run_show(&state, &id).await,
        Command::Delete { id } => run_delete(&state, &id).await,
        Command::Today => run_today(&state).await,
        Command::Goal { kcal } => run_goal(&state, kcal).await,
    }
}
