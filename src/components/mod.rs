pub mod countdown;
pub mod match_card;
pub mod theme;
