use crate::entity::prelude::*;
use crate::entity::{pos_digital_menus, pos_menu_themes};
use crate::menu::slug::{generate_menu_slug, with_suffix};
use crate::menu::themes::DEFAULT_THEME;
use sea_orm::sea_query::Expr;
use sea_orm::*;

/// 数字菜单与主题仓库
pub struct DigitalMenuRepository;

impl DigitalMenuRepository {
    // ==================== 数字菜单 ====================

    /// 获取账户的数字菜单
    pub async fn find_by_account(
        db: &DatabaseConnection,
        account_id: &str,
    ) -> Result<Option<pos_digital_menus::Model>, DbErr> {
        PosDigitalMenus::find()
            .filter(pos_digital_menus::Column::PosAccountId.eq(account_id))
            .one(db)
            .await
    }

    /// 根据公开链接标识查询数字菜单
    pub async fn find_by_slug(
        db: &DatabaseConnection,
        slug: &str,
    ) -> Result<Option<pos_digital_menus::Model>, DbErr> {
        PosDigitalMenus::find()
            .filter(pos_digital_menus::Column::PublicUrlSlug.eq(slug))
            .one(db)
            .await
    }

    /// 为餐厅名生成未被占用的标识，冲突时依次追加 -2、-3 ...
    pub async fn unique_slug<C: ConnectionTrait>(
        conn: &C,
        restaurant_name: &str,
    ) -> Result<String, DbErr> {
        let base = generate_menu_slug(restaurant_name);
        let taken: Vec<String> = PosDigitalMenus::find()
            .select_only()
            .column(pos_digital_menus::Column::PublicUrlSlug)
            .filter(pos_digital_menus::Column::PublicUrlSlug.starts_with(base.as_str()))
            .into_tuple()
            .all(conn)
            .await?;

        let mut candidate = base.clone();
        let mut n = 2u32;
        while taken.iter().any(|slug| *slug == candidate) {
            candidate = with_suffix(&base, n);
            n += 1;
        }
        Ok(candidate)
    }

    /// 初始化数字菜单：已存在时直接返回，否则创建菜单与默认主题
    ///
    /// 返回 (菜单, 是否新建)。
    pub async fn initialize(
        db: &DatabaseConnection,
        account_id: &str,
        restaurant_name: &str,
        now: i64,
    ) -> Result<(pos_digital_menus::Model, bool), DbErr> {
        if let Some(existing) = Self::find_by_account(db, account_id).await? {
            return Ok((existing, false));
        }

        let txn = db.begin().await?;

        let slug = Self::unique_slug(&txn, restaurant_name).await?;
        let menu = pos_digital_menus::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            pos_account_id: Set(account_id.to_string()),
            public_url_slug: Set(slug),
            is_active: Set(true),
            qr_code_generated: Set(false),
            last_generated_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let has_active_theme = PosMenuThemes::find()
            .filter(pos_menu_themes::Column::PosAccountId.eq(account_id))
            .filter(pos_menu_themes::Column::Active.eq(true))
            .count(&txn)
            .await?
            > 0;
        if !has_active_theme {
            pos_menu_themes::ActiveModel {
                id: Set(uuid::Uuid::new_v4().to_string()),
                pos_account_id: Set(account_id.to_string()),
                theme_name: Set(DEFAULT_THEME.to_string()),
                custom_colors: Set(None),
                active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        Ok((menu, true))
    }

    /// 启用或停用公开菜单
    pub async fn set_active(
        db: &DatabaseConnection,
        menu: pos_digital_menus::Model,
        is_active: bool,
        now: i64,
    ) -> Result<pos_digital_menus::Model, DbErr> {
        let mut active: pos_digital_menus::ActiveModel = menu.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(now);
        active.update(db).await
    }

    /// 记录二维码已生成
    pub async fn mark_qr_generated(
        db: &DatabaseConnection,
        menu: pos_digital_menus::Model,
        now: i64,
    ) -> Result<pos_digital_menus::Model, DbErr> {
        let mut active: pos_digital_menus::ActiveModel = menu.into();
        active.qr_code_generated = Set(true);
        active.last_generated_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(db).await
    }

    // ==================== 主题 ====================

    /// 获取账户当前启用的主题
    pub async fn active_theme(
        db: &DatabaseConnection,
        account_id: &str,
    ) -> Result<Option<pos_menu_themes::Model>, DbErr> {
        PosMenuThemes::find()
            .filter(pos_menu_themes::Column::PosAccountId.eq(account_id))
            .filter(pos_menu_themes::Column::Active.eq(true))
            .order_by_desc(pos_menu_themes::Column::UpdatedAt)
            .one(db)
            .await
    }

    /// 切换主题：停用其它主题，再启用（或创建）目标主题，保证只有一个启用
    pub async fn set_theme(
        db: &DatabaseConnection,
        account_id: &str,
        theme_name: &str,
        custom_colors: Option<CustomColors>,
        now: i64,
    ) -> Result<pos_menu_themes::Model, DbErr> {
        let txn = db.begin().await?;

        PosMenuThemes::update_many()
            .col_expr(pos_menu_themes::Column::Active, Expr::value(false))
            .filter(pos_menu_themes::Column::PosAccountId.eq(account_id))
            .exec(&txn)
            .await?;

        let existing = PosMenuThemes::find()
            .filter(pos_menu_themes::Column::PosAccountId.eq(account_id))
            .filter(pos_menu_themes::Column::ThemeName.eq(theme_name))
            .one(&txn)
            .await?;

        let theme = match existing {
            Some(row) => {
                let mut active: pos_menu_themes::ActiveModel = row.into();
                active.custom_colors = Set(custom_colors);
                active.active = Set(true);
                active.updated_at = Set(now);
                active.update(&txn).await?
            }
            None => {
                pos_menu_themes::ActiveModel {
                    id: Set(uuid::Uuid::new_v4().to_string()),
                    pos_account_id: Set(account_id.to_string()),
                    theme_name: Set(theme_name.to_string()),
                    custom_colors: Set(custom_colors),
                    active: Set(true),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?
            }
        };

        txn.commit().await?;

        Ok(theme)
    }
}
