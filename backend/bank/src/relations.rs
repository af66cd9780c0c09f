//! Serving relation over an in-memory bank.
//!
//! Each dish embeds the ids of the restaurants serving it. Ids that point at
//! nothing are not an error, they just contribute nothing to the result.
use crate::{
    Bank,
    models::{Dish, DishId, Restaurant, RestaurantId},
};

impl Bank {
    /// Dishes served at `restaurant_id`, in collection order.
    pub fn menu_for(&self, restaurant_id: RestaurantId) -> Vec<Dish> {
        self.dishes
            .iter()
            .filter(|dish| dish.restaurant_ids.contains(&restaurant_id))
            .cloned()
            .collect()
    }

    /// Restaurants serving `dish_id`, in the order the dish lists them.
    ///
    /// An unknown dish yields an empty list rather than a not-found.
    pub fn restaurants_serving(&self, dish_id: DishId) -> Vec<Restaurant> {
        let Some(dish) = self.dish(dish_id) else {
            return Vec::new();
        };

        dish.restaurant_ids
            .iter()
            .filter_map(|id| self.restaurant(*id))
            .cloned()
            .collect()
    }
}
