use yt_api::{ApiError, YouTubeClient};

use crate::takeout::{PlaylistItemRecord, SubscriptionRecord};

/// Create the destination playlist, then add every exported video to it in
/// file order. A failed creation aborts; a failed item insert is reported
/// and the loop continues.
pub async fn transfer_playlist(
    client: &YouTubeClient,
    list_name: &str,
    records: &[PlaylistItemRecord],
) -> Result<(), ApiError> {
    let playlist_id = client.create_playlist(list_name, "", "private").await?;
    println!("New playlist ID = {playlist_id}");

    for (index, record) in records.iter().enumerate() {
        let video_id = &record.content_details.video_id;
        println!("{index} {video_id}");
        if let Err(err) = client.add_video_to_playlist(&playlist_id, video_id).await {
            eprintln!("Error adding video to playlist: {err}");
        }
    }

    Ok(())
}

/// Subscribe to every exported channel in file order. The first failed
/// subscription aborts the run.
pub async fn transfer_subscriptions(
    client: &YouTubeClient,
    records: &[SubscriptionRecord],
) -> Result<(), ApiError> {
    for (index, record) in records.iter().enumerate() {
        let channel_id = &record.snippet.resource_id.channel_id;
        println!("{index} {channel_id}");
        client.subscribe(channel_id).await?;
    }

    Ok(())
}
