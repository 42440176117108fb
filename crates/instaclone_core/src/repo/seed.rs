//! Fixed demo collection written when storage holds no posts.

use crate::model::post::{Comment, Post};
use crate::model::profile::{avatar_for, UserProfile};

fn demo_user(id: &str, username: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        username: username.to_string(),
        avatar: avatar_for(username),
    }
}

fn demo_comment(id: &str, user: UserProfile, text: &str, created_at: &str) -> Comment {
    Comment {
        id: id.to_string(),
        user,
        text: text.to_string(),
        created_at: created_at.to_string(),
    }
}

/// Returns the three seed posts in display order.
pub fn seed_posts() -> Vec<Post> {
    vec![
        Post {
            id: "1".to_string(),
            user: demo_user("2", "nature_photography"),
            image_url: "https://images.unsplash.com/photo-1505144808419-1957a94ca61e?q=80&w=1000&auto=format&fit=crop".to_string(),
            caption: "Beautiful sunset over the mountains 🌄".to_string(),
            likes: 243,
            liked: false,
            comments: vec![demo_comment(
                "c1",
                demo_user("3", "traveler123"),
                "Wow! This view is incredible!",
                "2023-05-10T14:23:00Z",
            )],
            created_at: "2023-05-09T18:30:00Z".to_string(),
        },
        Post {
            id: "2".to_string(),
            user: demo_user("4", "foodie_adventures"),
            image_url: "https://images.unsplash.com/photo-1565299624946-b28f40a0ae38?q=80&w=1000&auto=format&fit=crop".to_string(),
            caption: "Homemade pizza night! 🍕 #foodporn #homecooking".to_string(),
            likes: 187,
            liked: false,
            comments: vec![demo_comment(
                "c2",
                demo_user("5", "chef_mike"),
                "That looks delicious! Care to share the recipe?",
                "2023-05-11T09:14:00Z",
            )],
            created_at: "2023-05-11T08:45:00Z".to_string(),
        },
        Post {
            id: "3".to_string(),
            user: demo_user("6", "fitness_goals"),
            image_url: "https://images.unsplash.com/photo-1517836357463-d25dfeac3438?q=80&w=1000&auto=format&fit=crop".to_string(),
            caption: "Morning workout complete! 💪 #fitlife #motivation".to_string(),
            likes: 312,
            liked: false,
            comments: Vec::new(),
            created_at: "2023-05-12T06:20:00Z".to_string(),
        },
    ]
}
