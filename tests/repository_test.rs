mod common;

use common::{seed_account, test_state};
use resto_pos_lib::database::db::backup_database;
use resto_pos_lib::database::dto::{NewOrder, OrderItemInput, UpsertSettingsArgs};
use resto_pos_lib::database::repository::{
    accounts_repository::{AccountsRepository, LICENSE_ACTIVE},
    categories_repository::CategoriesRepository,
    digital_menu_repository::DigitalMenuRepository,
    orders_repository::OrdersRepository,
    settings_repository::SettingsRepository,
};
use resto_pos_lib::entity::custom_colors::CustomColors;
use resto_pos_lib::entity::pos_accounts;
use tempfile::TempDir;

const DAY: i64 = 86_400;

fn names(categories: &[resto_pos_lib::entity::pos_categories::Model]) -> Vec<&str> {
    categories.iter().map(|c| c.name.as_str()).collect()
}

fn new_order(number: Option<&str>, lines: &[(&str, i32, f64)]) -> NewOrder {
    let items: Vec<OrderItemInput> = lines
        .iter()
        .map(|(name, quantity, price)| OrderItemInput {
            item_name: name.to_string(),
            quantity: *quantity,
            unit_price: *price,
        })
        .collect();
    let total = items
        .iter()
        .map(|i| i.unit_price * f64::from(i.quantity))
        .sum();
    NewOrder {
        order_number: number.map(str::to_string),
        payment_method: "cash".to_string(),
        total_amount: total,
        items,
    }
}

#[tokio::test]
async fn account_creation_writes_all_defaults() {
    let state = test_state().await;
    let account = seed_account(&state, "9876543210", "Spice Garden").await;

    assert_eq!(account.status, pos_accounts::STATUS_ACTIVE);

    let settings = SettingsRepository::find_by_account(&state.db, &account.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settings.restaurant_name, "Spice Garden");
    assert_eq!(settings.tax_rate, 5.0);
    assert!(settings.gst_inclusive);

    let subscription = AccountsRepository::latest_subscription(&state.db, &account.id)
        .await
        .unwrap()
        .unwrap();
    assert!(subscription.is_valid_at(state.now()));

    let telemetry = AccountsRepository::find_telemetry(&state.db, &account.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(telemetry.total_orders, 0);

    let categories = CategoriesRepository::list(&state.db, &account.id).await.unwrap();
    assert_eq!(names(&categories), vec!["Mains", "Beverages", "Desserts"]);

    let overviews = AccountsRepository::list_overviews(&state.db, state.now())
        .await
        .unwrap();
    assert_eq!(overviews.len(), 1);
    assert_eq!(overviews[0].license_status, LICENSE_ACTIVE);
    assert_eq!(overviews[0].days_remaining, 30);
}

#[tokio::test]
async fn toggling_status_flips_between_active_and_disabled() {
    let state = test_state().await;
    let account = seed_account(&state, "9876543210", "Spice Garden").await;

    let status = AccountsRepository::toggle_status(&state.db, &account.id, state.now())
        .await
        .unwrap();
    assert_eq!(status.as_deref(), Some(pos_accounts::STATUS_DISABLED));

    let status = AccountsRepository::toggle_status(&state.db, &account.id, state.now())
        .await
        .unwrap();
    assert_eq!(status.as_deref(), Some(pos_accounts::STATUS_ACTIVE));

    let missing = AccountsRepository::toggle_status(&state.db, "nope", state.now())
        .await
        .unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn license_extends_from_later_of_now_and_expiry() {
    let state = test_state().await;
    let account = seed_account(&state, "9876543210", "Spice Garden").await;
    let now = state.now();

    let current = AccountsRepository::latest_subscription(&state.db, &account.id)
        .await
        .unwrap()
        .unwrap()
        .valid_until;

    let extended = AccountsRepository::extend_license(&state.db, &account.id, 10, now)
        .await
        .unwrap();
    assert_eq!(extended, current + 10 * DAY);

    // 到期之后再延长，从当前时间起算
    let far_future = extended + 100 * DAY;
    let renewed = AccountsRepository::extend_license(&state.db, &account.id, 5, far_future)
        .await
        .unwrap();
    assert_eq!(renewed, far_future + 5 * DAY);
}

#[tokio::test]
async fn search_filters_by_term_and_status() {
    let state = test_state().await;
    seed_account(&state, "9000000001", "Spice Garden").await;
    let cafe = seed_account(&state, "9000000002", "Blue Cafe").await;
    AccountsRepository::toggle_status(&state.db, &cafe.id, state.now())
        .await
        .unwrap();

    let (found, total) =
        AccountsRepository::search(&state.db, Some("spice"), None, 50, 0, state.now())
            .await
            .unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].restaurant_name, "Spice Garden");

    let (found, total) =
        AccountsRepository::search(&state.db, Some("0002"), None, 50, 0, state.now())
            .await
            .unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].id, cafe.id);

    let (_, total) =
        AccountsRepository::search(&state.db, None, Some("disabled"), 50, 0, state.now())
            .await
            .unwrap();
    assert_eq!(total, 1);

    let (page, total) = AccountsRepository::search(&state.db, None, None, 1, 1, state.now())
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(page.len(), 1);
}

#[tokio::test]
async fn categories_are_replaced_in_order() {
    let state = test_state().await;
    let account = seed_account(&state, "9876543210", "Spice Garden").await;
    let before = CategoriesRepository::list(&state.db, &account.id).await.unwrap();
    let mains_id = before[0].id.clone();

    let after = CategoriesRepository::replace(
        &state.db,
        &account.id,
        vec![
            " Starters ".to_string(),
            "Mains".to_string(),
            "".to_string(),
            "Starters".to_string(),
            "Desserts".to_string(),
        ],
        state.now(),
    )
    .await
    .unwrap();

    assert_eq!(names(&after), vec!["Starters", "Mains", "Desserts"]);
    assert_eq!(after[1].id, mains_id);
    assert_eq!(
        after.iter().map(|c| c.sort_order).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[tokio::test]
async fn settings_patch_keeps_unspecified_fields() {
    let state = test_state().await;
    let account = seed_account(&state, "9876543210", "Spice Garden").await;

    let first = SettingsRepository::upsert(
        &state.db,
        UpsertSettingsArgs {
            account_id: account.id.clone(),
            restaurant_name: "Spice Garden".to_string(),
            phone: Some(Some("080-1234".to_string())),
            tax_rate: Some(12.0),
            ..Default::default()
        },
        state.now(),
    )
    .await
    .unwrap();
    assert_eq!(first.phone.as_deref(), Some("080-1234"));
    assert_eq!(first.tax_rate, 12.0);

    let second = SettingsRepository::upsert(
        &state.db,
        UpsertSettingsArgs {
            account_id: account.id.clone(),
            restaurant_name: "Spice Garden Express".to_string(),
            phone: Some(None),
            ..Default::default()
        },
        state.now(),
    )
    .await
    .unwrap();
    assert_eq!(second.restaurant_name, "Spice Garden Express");
    assert_eq!(second.phone, None);
    assert_eq!(second.tax_rate, 12.0);
    assert_eq!(second.id, first.id);
}

#[tokio::test]
async fn orders_are_numbered_per_day_and_update_telemetry() {
    let state = test_state().await;
    let account = seed_account(&state, "9876543210", "Spice Garden").await;
    let now = state.now();
    let prefix = "ORD-20250601-";

    let first = OrdersRepository::create(
        &state.db,
        &account.id,
        new_order(None, &[("Masala Dosa", 2, 80.0), ("Filter Coffee", 1, 35.5)]),
        prefix,
        now,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(first.order.order_number, "ORD-20250601-0001");
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.order.total_amount, 195.5);

    let second = OrdersRepository::create(
        &state.db,
        &account.id,
        new_order(None, &[("Filter Coffee", 2, 35.5)]),
        prefix,
        now,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(second.order.order_number, "ORD-20250601-0002");

    let duplicate = OrdersRepository::create(
        &state.db,
        &account.id,
        new_order(Some("ORD-20250601-0001"), &[("Tea", 1, 10.0)]),
        prefix,
        now,
    )
    .await
    .unwrap();
    assert!(duplicate.is_none());

    let telemetry = AccountsRepository::find_telemetry(&state.db, &account.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(telemetry.total_orders, 2);
    assert_eq!(telemetry.total_revenue, 266.5);

    assert_eq!(OrdersRepository::count(&state.db, &account.id).await.unwrap(), 2);
    let listed = OrdersRepository::list_with_items(&state.db, &account.id, 10, 0)
        .await
        .unwrap();
    assert_eq!(listed[0].order.order_number, "ORD-20250601-0002");

    let records: Vec<_> = listed.iter().filter_map(|o| o.to_record()).collect();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn orders_are_scoped_to_their_account() {
    let state = test_state().await;
    let owner = seed_account(&state, "9000000001", "Spice Garden").await;
    let other = seed_account(&state, "9000000002", "Blue Cafe").await;

    let order = OrdersRepository::create(
        &state.db,
        &owner.id,
        new_order(None, &[("Tea", 1, 10.0)]),
        "ORD-20250601-",
        state.now(),
    )
    .await
    .unwrap()
    .unwrap();

    let found = OrdersRepository::find_owned(&state.db, &other.id, &order.order.id)
        .await
        .unwrap();
    assert!(found.is_none());

    // 不同账户的订单号互不影响
    let theirs = OrdersRepository::create(
        &state.db,
        &other.id,
        new_order(None, &[("Tea", 1, 10.0)]),
        "ORD-20250601-",
        state.now(),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(theirs.order.order_number, "ORD-20250601-0001");
}

#[tokio::test]
async fn digital_menu_slugs_are_unique_and_initialization_is_idempotent() {
    let state = test_state().await;
    let first = seed_account(&state, "9000000001", "Spice Garden").await;
    let second = seed_account(&state, "9000000002", "Spice Garden").await;

    let (menu, created) =
        DigitalMenuRepository::initialize(&state.db, &first.id, "Spice Garden!", state.now())
            .await
            .unwrap();
    assert!(created);
    assert_eq!(menu.public_url_slug, "spice-garden");

    let (again, created) =
        DigitalMenuRepository::initialize(&state.db, &first.id, "Other Name", state.now())
            .await
            .unwrap();
    assert!(!created);
    assert_eq!(again.id, menu.id);

    let (other, _) =
        DigitalMenuRepository::initialize(&state.db, &second.id, "Spice Garden", state.now())
            .await
            .unwrap();
    assert_eq!(other.public_url_slug, "spice-garden-2");

    let theme = DigitalMenuRepository::active_theme(&state.db, &first.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(theme.theme_name, "modern");
}

#[tokio::test]
async fn switching_themes_leaves_one_active() {
    let state = test_state().await;
    let account = seed_account(&state, "9876543210", "Spice Garden").await;
    DigitalMenuRepository::initialize(&state.db, &account.id, "Spice Garden", state.now())
        .await
        .unwrap();

    let colors = CustomColors {
        primary: Some("#ff6600".to_string()),
        ..Default::default()
    };
    DigitalMenuRepository::set_theme(&state.db, &account.id, "classic", Some(colors), state.now())
        .await
        .unwrap();
    let back = DigitalMenuRepository::set_theme(&state.db, &account.id, "modern", None, state.now())
        .await
        .unwrap();

    let active = DigitalMenuRepository::active_theme(&state.db, &account.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, back.id);
    assert_eq!(active.theme_name, "modern");

    let classic = DigitalMenuRepository::set_theme(
        &state.db,
        &account.id,
        "classic",
        None,
        state.now(),
    )
    .await
    .unwrap();
    assert!(classic.active);
    assert_eq!(classic.custom_colors, None);
}

#[tokio::test]
async fn backup_writes_a_file() {
    let state = test_state().await;
    seed_account(&state, "9876543210", "Spice Garden").await;
    let dir = TempDir::new().unwrap();

    let result = backup_database(&state.db, dir.path()).await.unwrap();

    assert!(std::path::Path::new(&result.path).exists());
    assert!(result.path.ends_with(".db"));
}
