//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;

use newsroom_core::domain::PostType;

/// Stored form of [`PostType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PostKind {
    #[sea_orm(string_value = "article")]
    Article,
    #[sea_orm(string_value = "news")]
    News,
}

impl From<PostKind> for PostType {
    fn from(kind: PostKind) -> Self {
        match kind {
            PostKind::Article => PostType::Article,
            PostKind::News => PostType::News,
        }
    }
}

impl From<PostType> for PostKind {
    fn from(post_type: PostType) -> Self {
        match post_type {
            PostType::Article => PostKind::Article,
            PostType::News => PostKind::News,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub post_type: PostKind,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub created_at: DateTimeWithTimeZone,
    pub author_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::author::Entity",
        from = "Column::AuthorId",
        to = "super::author::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::post_category::Entity")]
    PostCategory,
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_category::Relation::Post.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Build the domain post from a row and its linked categories.
    pub fn into_post(self, categories: Vec<super::category::Model>) -> newsroom_core::domain::Post {
        newsroom_core::domain::Post {
            id: self.id,
            post_type: self.post_type.into(),
            title: self.title,
            text: self.text,
            created_at: self.created_at.into(),
            author_id: self.author_id,
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }
}
