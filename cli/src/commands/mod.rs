mod helpers;
mod plan;
mod recipe;
mod shop;
mod user;

pub(crate) use plan::{
    cmd_plan_add, cmd_plan_create, cmd_plan_delete, cmd_plan_list, cmd_plan_share, cmd_plan_show,
};
pub(crate) use recipe::{
    cmd_recipe_add, cmd_recipe_delete, cmd_recipe_import, cmd_recipe_list, cmd_recipe_rate,
    cmd_recipe_show,
};
pub(crate) use shop::cmd_shop;
pub(crate) use user::{cmd_user_add, cmd_user_list};
