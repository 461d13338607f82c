use sea_orm::entity::prelude::*;
use sea_orm::QueryOrder;

use super::{user, user_group, user_group_member};

/// Пользователи CMS. Карточки ведёт основная CMS, здесь они только читаются.
#[derive(Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await
    }
}

#[derive(Clone)]
pub struct UserGroupRepository {
    db: DatabaseConnection,
}

impl UserGroupRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_name(&self, group_name: &str) -> Result<Option<user_group::Model>, DbErr> {
        user_group::Entity::find()
            .filter(user_group::Column::GroupName.eq(group_name))
            .one(&self.db)
            .await
    }

    /// Участники группы, кроме уволенных (по id)
    pub async fn active_members(&self, group_id: i64) -> Result<Vec<user::Model>, DbErr> {
        let member_ids: Vec<String> = user_group_member::Entity::find()
            .filter(user_group_member::Column::GroupId.eq(group_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .collect();
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }

        user::Entity::find()
            .filter(user::Column::UserId.is_in(member_ids))
            .filter(user::Column::Retired.eq(false))
            .order_by_asc(user::Column::UserId)
            .all(&self.db)
            .await
    }
}

/// Заполнение справочников в тестах
#[cfg(test)]
pub(crate) mod testing {
    use super::super::{user, user_group, user_group_member};
    use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

    pub fn user(id: &str, email: Option<&str>, retired: bool) -> user::Model {
        user::Model {
            user_id: id.to_string(),
            user_name: id.to_uppercase(),
            email: email.map(str::to_string),
            retired,
        }
    }

    pub async fn insert_user(db: &DatabaseConnection, model: user::Model) {
        user::ActiveModel {
            user_id: Set(model.user_id),
            user_name: Set(model.user_name),
            email: Set(model.email),
            retired: Set(model.retired),
        }
        .insert(db)
        .await
        .unwrap();
    }

    /// Группа с участниками, возвращает id группы
    pub async fn insert_group(db: &DatabaseConnection, name: &str, members: &[&str]) -> i64 {
        let group = user_group::ActiveModel {
            group_id: sea_orm::ActiveValue::NotSet,
            group_name: Set(name.to_string()),
        }
        .insert(db)
        .await
        .unwrap();

        for user_id in members {
            user_group_member::ActiveModel {
                group_id: Set(group.group_id),
                user_id: Set(user_id.to_string()),
            }
            .insert(db)
            .await
            .unwrap();
        }
        group.group_id
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{insert_group, insert_user, user};
    use super::*;
    use crate::shared::data::db::test_connection;

    #[tokio::test]
    async fn test_get_user() {
        let db = test_connection().await;
        insert_user(&db, user("alice", Some("alice@example.com"), false)).await;
        let users = UserRepository::new(db);

        let alice = users.get("alice").await.unwrap().unwrap();
        assert_eq!(alice.user_name, "ALICE");
        assert_eq!(alice.deliverable_email(), Some("alice@example.com"));
        assert!(users.get("nobody").await.unwrap().is_none());
    }

    #[test]
    fn test_deliverable_email() {
        assert_eq!(
            user("a", Some(" a@example.com "), false).deliverable_email(),
            Some("a@example.com")
        );
        assert_eq!(user("a", Some("  "), false).deliverable_email(), None);
        assert_eq!(user("a", Some("a@example.com"), true).deliverable_email(), None);
        assert_eq!(user("a", None, false).deliverable_email(), None);
    }

    #[tokio::test]
    async fn test_group_members() {
        let db = test_connection().await;
        insert_user(&db, user("bob", Some("bob@example.com"), false)).await;
        insert_user(&db, user("carol", None, false)).await;
        insert_user(&db, user("dave", Some("dave@example.com"), true)).await;
        let ops = insert_group(&db, "Operators", &["carol", "bob", "dave"]).await;
        let empty = insert_group(&db, "Auditors", &[]).await;
        let groups = UserGroupRepository::new(db);

        let members: Vec<String> = groups
            .active_members(ops)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.user_id)
            .collect();
        assert_eq!(members, vec!["bob", "carol"]);
        assert!(groups.active_members(empty).await.unwrap().is_empty());

        assert_eq!(groups.find_by_name("Operators").await.unwrap().unwrap().group_id, ops);
        assert!(groups.find_by_name("Nobody").await.unwrap().is_none());
    }
}
