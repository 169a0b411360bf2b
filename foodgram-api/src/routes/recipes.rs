/// Recipe endpoints
///
/// Creation and update go through the Association Writer, so a recipe never
/// ends up with a partial set of ingredients or tags.
///
/// ```text
/// POST /api/recipes/
/// Authorization: Bearer <token>
///
/// {
///   "ingredients": [{ "id": "<ingredient uuid>", "amount": 200 }],
///   "tags": ["<tag uuid>"],
///   "image": "data:image/png;base64,...",
///   "name": "Pancakes",
///   "text": "Mix and fry.",
///   "cooking_time": 20
/// }
/// ```

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use foodgram_shared::{
    auth::middleware::AuthContext,
    models::recipe::{Recipe, RecipeFilter, RecipeWithAssociations},
    recipes::{AssociationSet, IngredientAmount},
    store::{NewRecipe, RecipeChanges},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::responses::RecipeView,
};

/// Recipe creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeRequest {
    pub ingredients: Vec<IngredientAmount>,

    pub tags: Vec<Uuid>,

    #[validate(length(min = 1, message = "Image is required"))]
    pub image: String,

    #[validate(length(min = 1, max = 256, message = "Name must be 1 to 256 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,

    #[validate(range(min = 1, message = "Cooking time must be at least 1 minute"))]
    pub cooking_time: i32,
}

/// Recipe update request
///
/// Scalar fields left out keep their value. Ingredients and tags are
/// always replaced as a whole.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRecipeRequest {
    pub ingredients: Option<Vec<IngredientAmount>>,

    pub tags: Option<Vec<Uuid>>,

    #[validate(length(min = 1, message = "Image must not be empty"))]
    pub image: Option<String>,

    #[validate(length(min = 1, max = 256, message = "Name must be 1 to 256 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: Option<String>,

    #[validate(range(min = 1, message = "Cooking time must be at least 1 minute"))]
    pub cooking_time: Option<i32>,
}

impl UpdateRecipeRequest {
    fn associations(&mut self) -> ApiResult<AssociationSet> {
        let ingredients = self
            .ingredients
            .take()
            .ok_or_else(|| ApiError::field("ingredients", "This field is required"))?;
        let tags = self
            .tags
            .take()
            .ok_or_else(|| ApiError::field("tags", "This field is required"))?;

        Ok(AssociationSet::new(ingredients, tags)?)
    }
}

/// Builds a listing filter from query pairs
///
/// Recognised keys: `author`, `tags` (repeatable slug), `is_favorited`,
/// `is_in_shopping_cart`. The two flags need a viewer and are ignored for
/// anonymous requests.
pub fn parse_filter(params: &[(String, String)], viewer: Option<Uuid>) -> ApiResult<RecipeFilter> {
    let mut filter = RecipeFilter::default();

    for (key, value) in params {
        match key.as_str() {
            "author" => {
                let author_id = value
                    .parse::<Uuid>()
                    .map_err(|_| ApiError::field("author", format!("Invalid author id: {value}")))?;
                filter.author_id = Some(author_id);
            }
            "tags" => filter.tag_slugs.push(value.clone()),
            "is_favorited" if flag(value) => filter.favorited_by = viewer,
            "is_in_shopping_cart" if flag(value) => filter.in_cart_of = viewer,
            _ => {}
        }
    }

    Ok(filter)
}

fn flag(value: &str) -> bool {
    matches!(value, "1" | "true" | "True")
}

/// Lists recipes, newest first
pub async fn list_recipes(
    State(state): State<AppState>,
    auth: Option<AuthContext>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<RecipeView>>> {
    let viewer = auth.map(|a| a.user_id);
    let filter = parse_filter(&params, viewer)?;

    let recipes = Recipe::list(&state.db, &filter).await?;

    let mut views = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        if let Some(view) = RecipeView::load(&state.db, viewer, recipe.id).await? {
            views.push(view);
        }
    }

    Ok(Json(views))
}

/// Creates a recipe owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: invalid fields, duplicate or empty ingredients/tags
/// - `404 Not Found`: an ingredient or tag does not exist
pub async fn create_recipe(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateRecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeView>)> {
    req.validate()?;
    let associations = AssociationSet::new(req.ingredients, req.tags)?;

    let created = state
        .store
        .create_recipe(
            auth.user_id,
            NewRecipe {
                name: req.name,
                text: req.text,
                image: req.image,
                cooking_time: req.cooking_time,
            },
            &associations,
        )
        .await?;

    info!(
        recipe_id = %created.recipe.id,
        author_id = %auth.user_id,
        "Recipe created"
    );

    let view = RecipeView::build(&state.db, Some(auth.user_id), created).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    auth: Option<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RecipeView>> {
    let recipe = find_recipe(&state, id).await?;
    let view = RecipeView::build(&state.db, auth.map(|a| a.user_id), recipe).await?;
    Ok(Json(view))
}

/// Updates a recipe; only the author may
///
/// # Errors
///
/// - `400 Bad Request`: invalid fields, missing or invalid ingredients/tags
/// - `403 Forbidden`: caller is not the author
/// - `404 Not Found`: unknown recipe, ingredient or tag
pub async fn update_recipe(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(mut req): Json<UpdateRecipeRequest>,
) -> ApiResult<Json<RecipeView>> {
    ensure_author(&find_recipe(&state, id).await?, auth)?;

    req.validate()?;
    let associations = req.associations()?;

    let updated = state
        .store
        .update_recipe(
            id,
            RecipeChanges {
                name: req.name,
                text: req.text,
                image: req.image,
                cooking_time: req.cooking_time,
            },
            &associations,
        )
        .await?;

    info!(recipe_id = %id, "Recipe updated");

    let view = RecipeView::build(&state.db, Some(auth.user_id), updated).await?;
    Ok(Json(view))
}

/// Deletes a recipe; only the author may
pub async fn delete_recipe(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ensure_author(&find_recipe(&state, id).await?, auth)?;

    if !state.store.delete_recipe(id).await? {
        return Err(ApiError::NotFound(format!("recipe not found: {id}")));
    }

    info!(recipe_id = %id, "Recipe deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Loads a recipe through the store, 404 if it does not exist
pub(crate) async fn find_recipe(state: &AppState, id: Uuid) -> ApiResult<RecipeWithAssociations> {
    state
        .store
        .find_recipe(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("recipe not found: {id}")))
}

fn ensure_author(recipe: &RecipeWithAssociations, auth: AuthContext) -> ApiResult<()> {
    if recipe.recipe.author_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the author can change this recipe".to_string(),
        ));
    }
    Ok(())
}
