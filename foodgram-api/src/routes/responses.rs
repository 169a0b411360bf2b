/// Response bodies shared by several resources
///
/// - [`UserProfile`]: a user as seen by the viewer
/// - [`RecipeView`]: a full recipe with author and viewer flags
/// - [`AuthorWithRecipes`]: a followed author with their latest recipes
///
/// Minified recipes are [`RecipeSummary`] from the shared models.

use foodgram_shared::models::{
    favorite::Favorite,
    recipe::{Recipe, RecipeIngredient, RecipeSummary, RecipeWithAssociations},
    shopping_cart::ShoppingCart,
    subscription::Subscription,
    tag::Tag,
    user::User,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl UserProfile {
    pub fn new(user: User, is_subscribed: bool) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
            avatar: user.avatar,
        }
    }

    /// Profile of `user` with `is_subscribed` resolved for `viewer`
    pub async fn for_viewer(db: &PgPool, viewer: Option<Uuid>, user: User) -> ApiResult<Self> {
        let is_subscribed = match viewer {
            Some(viewer) if viewer != user.id => Subscription::exists(db, viewer, user.id).await?,
            _ => false,
        };
        Ok(Self::new(user, is_subscribed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeView {
    pub id: Uuid,
    pub tags: Vec<Tag>,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeView {
    /// Full representation of a loaded recipe for `viewer`
    pub async fn build(
        db: &PgPool,
        viewer: Option<Uuid>,
        loaded: RecipeWithAssociations,
    ) -> ApiResult<Self> {
        let RecipeWithAssociations {
            recipe,
            ingredients,
            tags,
        } = loaded;

        let author = User::find_by_id(db, recipe.author_id)
            .await?
            .ok_or_else(|| ApiError::InternalError(format!("Recipe {} has no author", recipe.id)))?;
        let author = UserProfile::for_viewer(db, viewer, author).await?;

        let (is_favorited, is_in_shopping_cart) = match viewer {
            Some(viewer) => (
                Favorite::exists(db, viewer, recipe.id).await?,
                ShoppingCart::exists(db, viewer, recipe.id).await?,
            ),
            None => (false, false),
        };

        Ok(Self {
            id: recipe.id,
            tags,
            author,
            ingredients,
            is_favorited,
            is_in_shopping_cart,
            name: recipe.name,
            image: recipe.image,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        })
    }

    /// Loads a recipe and its associations from one snapshot, then builds
    /// the view
    ///
    /// `None` if the recipe is gone, e.g. deleted after it was listed.
    pub async fn load(db: &PgPool, viewer: Option<Uuid>, recipe_id: Uuid) -> ApiResult<Option<Self>> {
        match Recipe::find_with_associations(db, recipe_id).await? {
            Some(loaded) => Ok(Some(Self::build(db, viewer, loaded).await?)),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorWithRecipes {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

impl AuthorWithRecipes {
    /// `author` as followed by the viewer, with at most `recipes_limit` recipes
    pub async fn build(db: &PgPool, author: User, recipes_limit: Option<i64>) -> ApiResult<Self> {
        let recipes = Recipe::summaries_by_author(db, author.id, recipes_limit).await?;
        let recipes_count = Recipe::count_by_author(db, author.id).await?;

        Ok(Self {
            profile: UserProfile::new(author, true),
            recipes,
            recipes_count,
        })
    }
}
